mod add_toolbar;
mod block_handle;
mod document_view;
mod floating_toolbar;
mod menu_button;
mod mount;
mod shell;
mod slash_menu;
mod theme;

pub use add_toolbar::AddToolbar;
pub use block_handle::BlockHandle;
pub use document_view::{DocumentEvent, DocumentView};
pub use floating_toolbar::FloatingToolbar;
pub use menu_button::{MenuButton, MenuButtonShape, command_glyph};
pub use mount::{mount, register_container};
pub use shell::EditorShell;
pub use slash_menu::SlashCommandMenu;
pub use theme::{apply_theme, theme_mode};

use gpui::App;

pub fn init(cx: &mut App) {
    document_view::init(cx);
}
