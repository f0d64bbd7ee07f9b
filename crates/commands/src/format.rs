use scriptum_core::{MarkKind, range_fully_marked, set_mark_range};

use crate::action::{ActionError, ActionOutcome};
use crate::view::EditorView;

/// Adds `mark` to the selection, or removes it when every selected
/// character already carries it. Empty selections are left alone.
pub fn toggle_mark(mark: MarkKind, view: Option<&mut dyn EditorView>) -> ActionOutcome {
    let Some(view) = view else {
        tracing::warn!(mark = mark.name(), "mark toggled without an editor view");
        return ActionOutcome::NoView;
    };
    if view.state().selection().is_collapsed() {
        return ActionOutcome::Unchanged;
    }

    match apply_toggle(mark, view) {
        Ok(()) => ActionOutcome::Applied,
        Err(err) => {
            tracing::warn!(mark = mark.name(), "mark toggle rejected: {err}");
            ActionOutcome::Rejected(err.to_string())
        }
    }
}

fn apply_toggle(mark: MarkKind, view: &mut dyn EditorView) -> Result<(), ActionError> {
    let editor = view.state();
    let selection = editor.selection().clone();
    let on = !range_fully_marked(editor, &selection, mark)?;
    let tx = set_mark_range(editor, &selection, mark, on)?;
    view.dispatch(tx.scroll_into_view())?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatAction {
    Mark(MarkKind),
    /// Link editing is not wired up yet; selecting it only logs.
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatButton {
    pub id: &'static str,
    pub label: &'static str,
    pub tooltip: &'static str,
    pub action: FormatAction,
}

/// Buttons of the selection toolbar, left to right.
pub const FLOATING_TOOLBAR_BUTTONS: &[FormatButton] = &[
    FormatButton {
        id: "bold",
        label: "B",
        tooltip: "Bold",
        action: FormatAction::Mark(MarkKind::Bold),
    },
    FormatButton {
        id: "italic",
        label: "I",
        tooltip: "Italic",
        action: FormatAction::Mark(MarkKind::Italic),
    },
    FormatButton {
        id: "code",
        label: "</>",
        tooltip: "Code",
        action: FormatAction::Mark(MarkKind::Code),
    },
    FormatButton {
        id: "link",
        label: "Link",
        tooltip: "Link",
        action: FormatAction::Link,
    },
];

pub fn run_format(action: FormatAction, view: Option<&mut dyn EditorView>) -> ActionOutcome {
    match action {
        FormatAction::Mark(mark) => toggle_mark(mark, view),
        FormatAction::Link => {
            tracing::info!("link formatting is not implemented yet");
            ActionOutcome::Pending
        }
    }
}

/// Whether the toolbar should show `mark` as active for the selection.
pub fn mark_active(mark: MarkKind, view: &dyn EditorView) -> bool {
    let editor = view.state();
    range_fully_marked(editor, editor.selection(), mark).unwrap_or(false)
}
