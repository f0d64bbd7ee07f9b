use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Text,
    List,
    Media,
    Embed,
    Separator,
    Advanced,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::List => "list",
            Category::Media => "media",
            Category::Embed => "embed",
            Category::Separator => "separator",
            Category::Advanced => "advanced",
        }
    }

    /// Section title in the add menu. Categories without a fixed title use
    /// their capitalized name.
    pub fn display_name(self) -> String {
        match self {
            Category::Text => "Text & Formatting".to_string(),
            Category::List => "Lists".to_string(),
            Category::Separator => "Layout".to_string(),
            Category::Media => "Media".to_string(),
            Category::Advanced => "Advanced".to_string(),
            other => capitalize(other.as_str()),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Document mutation a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum BlockAction {
    Heading { level: u8 },
    BulletList,
    NumberedList,
    TodoList,
    Quote,
    CodeBlock,
    Divider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    Implemented(BlockAction),
    /// Declared in the catalog but not backed by a node type yet.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub id: &'static str,
    pub label: &'static str,
    pub description: Option<&'static str>,
    pub category: Category,
    pub action: CommandAction,
}

impl Command {
    const fn new(
        id: &'static str,
        label: &'static str,
        description: &'static str,
        category: Category,
        action: CommandAction,
    ) -> Self {
        Self {
            id,
            label,
            description: Some(description),
            category,
            action,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.action == CommandAction::Pending
    }
}

const BUILTIN_COMMANDS: &[Command] = &[
    Command::new(
        "heading1",
        "Heading 1",
        "Large section heading",
        Category::Text,
        CommandAction::Implemented(BlockAction::Heading { level: 1 }),
    ),
    Command::new(
        "heading2",
        "Heading 2",
        "Medium section heading",
        Category::Text,
        CommandAction::Implemented(BlockAction::Heading { level: 2 }),
    ),
    Command::new(
        "heading3",
        "Heading 3",
        "Small section heading",
        Category::Text,
        CommandAction::Implemented(BlockAction::Heading { level: 3 }),
    ),
    Command::new(
        "bullet",
        "Bullet List",
        "Create a bullet point list",
        Category::List,
        CommandAction::Implemented(BlockAction::BulletList),
    ),
    Command::new(
        "numbered",
        "Numbered List",
        "Create a numbered list",
        Category::List,
        CommandAction::Implemented(BlockAction::NumberedList),
    ),
    Command::new(
        "checklist",
        "To-do List",
        "Create a task checklist",
        Category::List,
        CommandAction::Implemented(BlockAction::TodoList),
    ),
    Command::new(
        "quote",
        "Quote",
        "Create a quote block",
        Category::Text,
        CommandAction::Implemented(BlockAction::Quote),
    ),
    Command::new(
        "code-block",
        "Code",
        "Insert a code block",
        Category::Text,
        CommandAction::Implemented(BlockAction::CodeBlock),
    ),
    Command::new(
        "divider",
        "Divider",
        "Add a divider line",
        Category::Separator,
        CommandAction::Implemented(BlockAction::Divider),
    ),
    Command::new(
        "table",
        "Table",
        "Insert a table",
        Category::Advanced,
        CommandAction::Pending,
    ),
    Command::new(
        "image",
        "Image",
        "Upload an image",
        Category::Media,
        CommandAction::Pending,
    ),
    Command::new(
        "video",
        "Video",
        "Embed a video",
        Category::Media,
        CommandAction::Pending,
    ),
    Command::new(
        "link",
        "Link",
        "Embed a link",
        Category::Embed,
        CommandAction::Pending,
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct CommandGroup {
    pub category: Category,
    pub commands: Vec<Command>,
}

/// Ordered command catalog plus its category grouping, built once.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    grouped: Vec<CommandGroup>,
}

static GLOBAL: LazyLock<CommandRegistry> = LazyLock::new(CommandRegistry::builtin);

impl CommandRegistry {
    pub fn new(commands: Vec<Command>) -> Self {
        let mut grouped: Vec<CommandGroup> = Vec::new();
        for command in &commands {
            match grouped.iter_mut().find(|g| g.category == command.category) {
                Some(group) => group.commands.push(*command),
                None => grouped.push(CommandGroup {
                    category: command.category,
                    commands: vec![*command],
                }),
            }
        }
        Self { commands, grouped }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_COMMANDS.to_vec())
    }

    /// The process-wide catalog.
    pub fn global() -> &'static CommandRegistry {
        &GLOBAL
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Categories in first-seen order, commands in catalog order.
    pub fn grouped(&self) -> &[CommandGroup] {
        &self.grouped
    }

    pub fn get(&self, id: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.id == id)
    }
}
