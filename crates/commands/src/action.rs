use scriptum_core::{
    ApplyError, Attrs, EditError, ElementNode, Node, Op, Point, Selection, Transaction,
    ordered_selection_points, replace_selection_with, set_block_type, wrap_block,
};

use crate::registry::{BlockAction, Command, CommandAction};
use crate::view::EditorView;

/// Seed text of a to-do item until checklists get their own node type.
pub const TODO_SEED: &str = "☐ ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// Nothing to do, e.g. toggling a mark on an empty selection.
    Unchanged,
    /// Placeholder command; intent logged only.
    Pending,
    NoView,
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

/// Runs a command against the view. Never panics; failures are logged and
/// reported in the outcome so callers can still close their menus.
pub fn run_command(command: &Command, view: Option<&mut dyn EditorView>) -> ActionOutcome {
    match view {
        Some(view) => execute_command(command, view),
        None => {
            tracing::warn!(command = command.id, "command invoked without an editor view");
            ActionOutcome::NoView
        }
    }
}

pub fn execute_command(command: &Command, view: &mut dyn EditorView) -> ActionOutcome {
    match command.action {
        CommandAction::Pending => {
            tracing::info!(command = command.id, "{} is not implemented yet", command.label);
            ActionOutcome::Pending
        }
        CommandAction::Implemented(action) => match run_block_action(action, view) {
            Ok(()) => {
                tracing::debug!(command = command.id, "command applied");
                ActionOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(command = command.id, "command rejected: {err}");
                ActionOutcome::Rejected(err.to_string())
            }
        },
    }
}

pub fn run_block_action(action: BlockAction, view: &mut dyn EditorView) -> Result<(), ActionError> {
    let tx = block_action_tx(action, view)?;
    view.dispatch(tx.scroll_into_view())?;
    Ok(())
}

fn block_action_tx(action: BlockAction, view: &dyn EditorView) -> Result<Transaction, ActionError> {
    let editor = view.state();
    let (from, _) = ordered_selection_points(editor.selection());
    let block = editor.resolve(&from).ok_or(EditError::NotInTextBlock)?;

    let tx = match action {
        BlockAction::Heading { level } => {
            if block.kind == "paragraph" || block.kind == "heading" {
                let template = heading_template(level);
                set_block_type(editor, &block.block_path, template)?
            } else {
                insert_block(view, Node::heading(level, vec![Node::text("")]))?
            }
        }
        BlockAction::BulletList => insert_block(view, list("bullet_list", ""))?,
        BlockAction::NumberedList => insert_block(view, list("ordered_list", ""))?,
        BlockAction::TodoList => {
            let insertion = replace_selection_with(editor, list("bullet_list", TODO_SEED))?;
            let cursor = insertion
                .cursor
                .map(|p| Point::new(p.path, TODO_SEED.len()))
                .ok_or_else(|| EditError::NoTextPosition(insertion.path.clone()))?;
            Transaction::new(insertion.ops).selection_after(Selection::collapsed(cursor))
        }
        BlockAction::Quote => {
            if block.kind == "paragraph" {
                wrap_block(editor, &block.block_path, "blockquote")?
            } else {
                insert_block(view, Node::blockquote(vec![Node::paragraph("")]))?
            }
        }
        BlockAction::CodeBlock => insert_block(view, Node::code_block(""))?,
        BlockAction::Divider if block.kind == "paragraph" => {
            // The paragraph gives way to the divider and a fresh empty one.
            let path = block.block_path.clone();
            let mut after = path.clone();
            if let Some(last) = after.last_mut() {
                *last += 1;
            }
            let ops = vec![
                Op::RemoveNode { path: path.clone() },
                Op::InsertNode {
                    path,
                    node: Node::divider(),
                },
                Op::InsertNode {
                    path: after.clone(),
                    node: Node::paragraph(""),
                },
            ];
            after.push(0);
            Transaction::new(ops).selection_after(Selection::collapsed(Point::new(after, 0)))
        }
        BlockAction::Divider => {
            let insertion = replace_selection_with(editor, Node::divider())?;
            let mut paragraph_path = insertion.path.clone();
            if let Some(last) = paragraph_path.last_mut() {
                *last += 1;
            }
            let mut ops = insertion.ops;
            ops.push(Op::InsertNode {
                path: paragraph_path.clone(),
                node: Node::paragraph(""),
            });
            paragraph_path.push(0);
            Transaction::new(ops).selection_after(Selection::collapsed(Point::new(paragraph_path, 0)))
        }
    };

    tracing::debug!(?action, block = %block.kind, "built block transaction");
    Ok(tx.source(format!("command:{}", action_name(action))))
}

/// Replaces the selection with `node` and puts the cursor inside it.
fn insert_block(view: &dyn EditorView, node: Node) -> Result<Transaction, EditError> {
    let insertion = replace_selection_with(view.state(), node)?;
    let cursor = insertion
        .cursor
        .ok_or_else(|| EditError::NoTextPosition(insertion.path.clone()))?;
    Ok(Transaction::new(insertion.ops).selection_after(Selection::collapsed(cursor)))
}

fn heading_template(level: u8) -> ElementNode {
    let mut attrs = Attrs::default();
    attrs.insert("level".to_string(), serde_json::Value::from(level));
    ElementNode {
        kind: "heading".to_string(),
        attrs,
        children: Vec::new(),
    }
}

fn list(kind: &str, seed: &str) -> Node {
    Node::element(kind, vec![Node::list_item(vec![Node::paragraph(seed)])])
}

fn action_name(action: BlockAction) -> &'static str {
    match action {
        BlockAction::Heading { .. } => "heading",
        BlockAction::BulletList => "bullet_list",
        BlockAction::NumberedList => "numbered_list",
        BlockAction::TodoList => "todo_list",
        BlockAction::Quote => "quote",
        BlockAction::CodeBlock => "code_block",
        BlockAction::Divider => "divider",
    }
}
