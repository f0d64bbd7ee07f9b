use scriptum_core::{Editor, MarkKind, ordered_selection_points};

use crate::action::{ActionOutcome, execute_command, run_command};
use crate::config::ShellConfig;
use crate::format::{FormatAction, run_format};
use crate::menu::{Anchor, MenuSession, SelectionToolbarSession, SlashMenu};
use crate::registry::CommandRegistry;
use crate::slash::{SlashDetector, SlashState, SlashTransition};
use crate::theme::Theme;
use crate::view::EditorView;

/// Keys the shell cares about before the document sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKey {
    Escape,
    ArrowUp,
    ArrowDown,
    Enter,
    Other,
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    AddMenu,
    AddButton,
    SlashMenu,
    FloatingToolbar,
    Document,
    Chrome,
}

/// Menu and theme state of one mounted editor.
pub struct ShellState {
    registry: &'static CommandRegistry,
    slash_menu_limit: usize,
    theme: Theme,
    add_menu: MenuSession,
    slash_menu: MenuSession,
    selection_toolbar: SelectionToolbarSession,
    detector: SlashDetector,
    /// The slash session was closed by a keystroke, not dismissed.
    slash_hidden_by_input: bool,
    highlighted: usize,
    hovered_block: Option<usize>,
    last_selected: Option<&'static str>,
}

impl ShellState {
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            registry: CommandRegistry::global(),
            slash_menu_limit: config.slash_menu_limit,
            theme: config.theme,
            add_menu: MenuSession::default(),
            slash_menu: MenuSession::default(),
            selection_toolbar: SelectionToolbarSession::default(),
            detector: SlashDetector::new(),
            slash_hidden_by_input: false,
            highlighted: 0,
            hovered_block: None,
            last_selected: None,
        }
    }

    pub fn registry(&self) -> &'static CommandRegistry {
        self.registry
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn add_menu(&self) -> &MenuSession {
        &self.add_menu
    }

    pub fn slash_menu(&self) -> &MenuSession {
        &self.slash_menu
    }

    pub fn selection_toolbar(&self) -> &SelectionToolbarSession {
        &self.selection_toolbar
    }

    pub fn slash_state(&self) -> &SlashState {
        self.detector.state()
    }

    pub fn hovered_block(&self) -> Option<usize> {
        self.hovered_block
    }

    /// Id of the command most recently picked from a menu.
    pub fn last_selected(&self) -> Option<&'static str> {
        self.last_selected
    }

    /// The slash menu's contents; `None` when closed or nothing matches.
    pub fn slash_menu_view(&self) -> Option<SlashMenu> {
        if !self.slash_menu.active {
            return None;
        }
        let mut menu = SlashMenu::new(self.registry, &self.slash_menu.query, self.slash_menu_limit);
        if menu.is_empty() {
            return None;
        }
        menu.highlight(self.highlighted);
        Some(menu)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        tracing::debug!(theme = self.theme.as_str(), "theme toggled");
        self.theme
    }

    pub fn set_hovered_block(&mut self, block: Option<usize>) {
        self.hovered_block = block;
    }

    /// Runs after every document change.
    pub fn on_state_change(&mut self, view: &dyn EditorView) {
        let hidden_by_input = std::mem::take(&mut self.slash_hidden_by_input);

        match self.detector.observe(view) {
            SlashTransition::Opened { query, anchor } => {
                self.add_menu.close();
                self.slash_menu.open(query, anchor);
                self.highlighted = 0;
            }
            SlashTransition::Updated { query } => {
                if self.slash_menu.active || hidden_by_input {
                    let anchor = self.slash_menu.anchor;
                    self.slash_menu.open(query, anchor);
                    self.highlighted = 0;
                }
            }
            SlashTransition::Closed => self.slash_menu.close(),
            SlashTransition::Unchanged => {
                if hidden_by_input && let SlashState::Active { query } = self.detector.state() {
                    let (query, anchor) = (query.clone(), self.slash_menu.anchor);
                    self.slash_menu.open(query, anchor);
                }
            }
        }

        self.update_selection_toolbar(view);
    }

    fn update_selection_toolbar(&mut self, view: &dyn EditorView) {
        let selection = view.state().selection();
        if selection.is_collapsed() {
            self.selection_toolbar.hide();
            return;
        }
        let (from, to) = ordered_selection_points(selection);
        match (view.coords_at(&from), view.coords_at(&to)) {
            (Some(start), Some(end)) => {
                let anchor = Anchor::new((start.left + end.right) / 2.0, start.top);
                self.selection_toolbar.show(anchor);
            }
            _ => self.selection_toolbar.hide(),
        }
    }

    /// Closes the slash session ahead of a keystroke; the next state change
    /// reopens it with the new query if the trigger is still live.
    pub fn on_text_input(&mut self) {
        if self.slash_menu.active {
            self.slash_menu.active = false;
            self.slash_hidden_by_input = true;
        }
    }

    /// Returns whether the key was consumed by the shell.
    pub fn on_key_down(&mut self, key: ShellKey, view: Option<&mut dyn EditorView>) -> bool {
        match key {
            ShellKey::Escape => {
                let any_open =
                    self.add_menu.active || self.slash_menu.active || self.selection_toolbar.visible;
                self.close_all(view.as_ref().map(|v| v.state()));
                any_open
            }
            ShellKey::ArrowUp | ShellKey::ArrowDown => {
                let Some(mut menu) = self.slash_menu_view() else {
                    return false;
                };
                if key == ShellKey::ArrowUp {
                    menu.move_up();
                } else {
                    menu.move_down();
                }
                self.highlighted = menu.highlighted;
                true
            }
            ShellKey::Enter => {
                let Some(command) = self
                    .slash_menu_view()
                    .and_then(|menu| menu.highlighted_command().copied())
                else {
                    return false;
                };
                self.select_command(command.id, view);
                true
            }
            ShellKey::Other => false,
        }
    }

    pub fn close_all(&mut self, editor: Option<&Editor>) {
        self.add_menu.close();
        self.selection_toolbar.hide();
        self.dismiss_slash(editor);
    }

    /// Closes the slash menu and keeps the detector from reopening it for
    /// the trigger currently before the cursor.
    fn dismiss_slash(&mut self, editor: Option<&Editor>) {
        self.slash_menu.close();
        self.slash_hidden_by_input = false;
        self.highlighted = 0;
        match editor {
            Some(editor) => self.detector.dismiss(editor),
            None => self.detector.reset(),
        }
    }

    pub fn on_pointer_down(&mut self, target: PointerTarget, editor: Option<&Editor>) {
        if !matches!(target, PointerTarget::AddMenu | PointerTarget::AddButton) {
            self.add_menu.close();
        }
        if target != PointerTarget::SlashMenu && self.slash_menu.active {
            self.dismiss_slash(editor);
        }
    }

    pub fn toggle_add_menu(&mut self, anchor: Anchor, editor: Option<&Editor>) {
        if self.add_menu.active {
            self.add_menu.close();
            return;
        }
        if self.slash_menu.active {
            self.dismiss_slash(editor);
        }
        self.add_menu.open("", anchor);
    }

    pub fn highlight(&mut self, ix: usize) {
        self.highlighted = ix;
    }

    /// Runs the command, records the pick, then closes both menus.
    pub fn select_command(
        &mut self,
        id: &str,
        view: Option<&mut dyn EditorView>,
    ) -> ActionOutcome {
        let Some(command) = self.registry.get(id) else {
            tracing::warn!(command = id, "unknown command selected");
            return ActionOutcome::Rejected(format!("unknown command `{id}`"));
        };

        let outcome = match view {
            Some(view) => {
                let outcome = execute_command(command, view);
                self.dismiss_slash(Some(view.state()));
                outcome
            }
            None => {
                let outcome = run_command(command, None);
                self.dismiss_slash(None);
                outcome
            }
        };
        self.last_selected = Some(command.id);
        self.add_menu.close();
        tracing::info!(command = command.id, ?outcome, "command selected");
        outcome
    }

    pub fn apply_format(&mut self, mark: MarkKind, view: Option<&mut dyn EditorView>) -> ActionOutcome {
        self.apply_format_action(FormatAction::Mark(mark), view)
    }

    /// Selection toolbar button press.
    pub fn apply_format_action(
        &mut self,
        action: FormatAction,
        view: Option<&mut dyn EditorView>,
    ) -> ActionOutcome {
        let outcome = run_format(action, view);
        tracing::debug!(?action, ?outcome, "format applied");
        outcome
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new(&ShellConfig::default())
    }
}
