use gpui::App;
use gpui_component::{Theme as UiTheme, ThemeMode};
use scriptum_commands::Theme;

pub fn theme_mode(theme: Theme) -> ThemeMode {
    match theme {
        Theme::Light => ThemeMode::Light,
        Theme::Dark => ThemeMode::Dark,
    }
}

/// Switches the global UI palette and repaints every window.
pub fn apply_theme(theme: Theme, cx: &mut App) {
    UiTheme::change(theme_mode(theme), None, cx);
    cx.refresh_windows();
    tracing::debug!(theme = theme.as_str(), "theme applied");
}
