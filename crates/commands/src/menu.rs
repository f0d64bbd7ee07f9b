use serde::{Deserialize, Serialize};

use crate::registry::{Command, CommandRegistry};

/// Number of slash menu entries shown at once.
pub const DEFAULT_SLASH_MENU_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl Anchor {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An open (or closed) command menu.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuSession {
    pub active: bool,
    pub query: String,
    pub anchor: Anchor,
}

impl MenuSession {
    pub fn open(&mut self, query: impl Into<String>, anchor: Anchor) {
        self.active = true;
        self.query = query.into();
        self.anchor = anchor;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionToolbarSession {
    pub visible: bool,
    pub anchor: Anchor,
}

impl SelectionToolbarSession {
    pub fn show(&mut self, anchor: Anchor) {
        self.visible = true;
        self.anchor = anchor;
    }

    pub fn hide(&mut self) {
        *self = Self::default();
    }
}

/// Commands whose label or description contains `query`, ignoring case.
pub fn slash_matches(registry: &CommandRegistry, query: &str, limit: usize) -> Vec<Command> {
    let query = query.to_lowercase();
    registry
        .commands()
        .iter()
        .filter(|c| {
            c.label.to_lowercase().contains(&query)
                || c.description
                    .is_some_and(|d| d.to_lowercase().contains(&query))
        })
        .take(limit)
        .copied()
        .collect()
}

/// Filtered slash menu contents with a keyboard highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct SlashMenu {
    pub matches: Vec<Command>,
    pub highlighted: usize,
}

impl SlashMenu {
    pub fn new(registry: &CommandRegistry, query: &str, limit: usize) -> Self {
        Self {
            matches: slash_matches(registry, query, limit),
            highlighted: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn highlighted_command(&self) -> Option<&Command> {
        self.matches.get(self.highlighted)
    }

    pub fn highlight(&mut self, ix: usize) {
        if !self.matches.is_empty() {
            self.highlighted = ix.min(self.matches.len() - 1);
        }
    }

    pub fn move_down(&mut self) {
        if !self.matches.is_empty() {
            self.highlighted = (self.highlighted + 1) % self.matches.len();
        }
    }

    pub fn move_up(&mut self) {
        if !self.matches.is_empty() {
            let len = self.matches.len();
            self.highlighted = (self.highlighted + len - 1) % len;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddMenuSection {
    pub title: String,
    pub commands: Vec<Command>,
}

pub fn add_menu_sections(registry: &CommandRegistry) -> Vec<AddMenuSection> {
    registry
        .grouped()
        .iter()
        .map(|group| AddMenuSection {
            title: group.category.display_name(),
            commands: group.commands.clone(),
        })
        .collect()
}
