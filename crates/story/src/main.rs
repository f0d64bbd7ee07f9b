use anyhow::Context as _;
use gpui::Application;
use scriptum_commands::{Container, ShellConfig};
use tracing_subscriber::EnvFilter;

/// Selector the demo window is registered under.
const EDITOR_SELECTOR: &str = "#editor";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ShellConfig::load_default()?;
    // Optional first argument: a document (JSON) or plain text file to open.
    let content = match std::env::args().nth(1) {
        Some(path) => Some(
            std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?,
        ),
        None => None,
    };

    let app = Application::new();
    app.run(move |cx| {
        gpui_component::init(cx);
        scriptum_editor::init(cx);
        cx.activate(true);

        scriptum_editor::register_container(EDITOR_SELECTOR, Container::default(), cx);
        if let Err(err) = scriptum_editor::mount(EDITOR_SELECTOR, content.as_deref(), config, cx) {
            tracing::error!("failed to mount editor: {err:#}");
            cx.quit();
        }
    });

    Ok(())
}
