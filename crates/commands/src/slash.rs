use scriptum_core::{Editor, Path};

use crate::menu::Anchor;
use crate::view::EditorView;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SlashState {
    #[default]
    Idle,
    Active { query: String },
}

impl SlashState {
    pub fn is_active(&self) -> bool {
        matches!(self, SlashState::Active { .. })
    }
}

/// What a document change meant for the slash menu.
#[derive(Debug, Clone, PartialEq)]
pub enum SlashTransition {
    /// Idle to Active: open the menu at the cursor.
    Opened { query: String, anchor: Anchor },
    /// Still active with a different query.
    Updated { query: String },
    Closed,
    Unchanged,
}

/// Text of the cursor's block up to the cursor, when the selection is a
/// cursor inside a block that has text.
fn trigger_context(editor: &Editor) -> Option<(Path, String)> {
    let selection = editor.selection();
    if !selection.is_collapsed() {
        return None;
    }
    let pos = editor.resolve(&selection.focus)?;
    if pos.text.is_empty() {
        return None;
    }
    Some((pos.block_path.clone(), pos.text_before().to_string()))
}

#[derive(Debug, Default)]
pub struct SlashDetector {
    state: SlashState,
    /// Trigger context at the moment the menu was dismissed. While the
    /// document still shows exactly this context the detector stays idle.
    dismissed: Option<(Path, String)>,
}

impl SlashDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlashState {
        &self.state
    }

    /// Pure transition on the text before the cursor; `None` when the
    /// selection is not a cursor in a non-empty block.
    pub fn transition(prev: &SlashState, text_before: Option<&str>) -> SlashState {
        let Some(text_before) = text_before else {
            return SlashState::Idle;
        };
        if text_before.ends_with('/') {
            return SlashState::Active {
                query: String::new(),
            };
        }
        match (text_before.rfind('/'), prev) {
            (Some(slash), SlashState::Active { .. }) => SlashState::Active {
                query: text_before[slash + 1..].to_string(),
            },
            _ => SlashState::Idle,
        }
    }

    pub fn observe(&mut self, view: &dyn EditorView) -> SlashTransition {
        let context = trigger_context(view.state());

        if let Some(dismissed) = &self.dismissed {
            if context.as_ref() == Some(dismissed) {
                return SlashTransition::Unchanged;
            }
            self.dismissed = None;
        }

        let next = Self::transition(&self.state, context.as_ref().map(|(_, t)| t.as_str()));
        let prev = std::mem::replace(&mut self.state, next.clone());

        let transition = match (prev, next) {
            (SlashState::Idle, SlashState::Active { query }) => {
                let focus = &view.state().selection().focus;
                let anchor = view
                    .coords_at(focus)
                    .map(|c| Anchor::new(c.left, c.bottom))
                    .unwrap_or_default();
                SlashTransition::Opened { query, anchor }
            }
            (SlashState::Active { query: old }, SlashState::Active { query }) if old != query => {
                SlashTransition::Updated { query }
            }
            (SlashState::Active { .. }, SlashState::Idle) => SlashTransition::Closed,
            _ => SlashTransition::Unchanged,
        };
        if transition != SlashTransition::Unchanged {
            tracing::debug!(?transition, "slash trigger");
        }
        transition
    }

    pub fn reset(&mut self) {
        self.state = SlashState::Idle;
    }

    /// Goes idle and ignores the trigger the document currently shows, so a
    /// `/` left before the cursor does not reopen the menu right away.
    pub fn dismiss(&mut self, editor: &Editor) {
        self.state = SlashState::Idle;
        self.dismissed = trigger_context(editor);
    }
}
