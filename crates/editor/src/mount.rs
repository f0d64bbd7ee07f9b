use gpui::*;
use gpui_component::Root;
use scriptum_commands::{Container, ContainerRegistry, MountPlan, ShellConfig, prepare_mount};

use crate::shell::EditorShell;
use crate::theme::apply_theme;

/// Containers the application has made available to [`mount`].
#[derive(Default)]
struct Containers(ContainerRegistry);

impl Global for Containers {}

pub fn register_container(selector: impl Into<String>, container: Container, cx: &mut App) {
    cx.default_global::<Containers>()
        .0
        .register(selector, container);
}

/// Opens an editor window in the container registered under `selector`.
///
/// `content` is either a serialized document or plain text; without it the
/// default placeholder document is used.
pub fn mount(
    selector: &str,
    content: Option<&str>,
    config: ShellConfig,
    cx: &mut App,
) -> anyhow::Result<WindowHandle<Root>> {
    let registry = cx
        .try_global::<Containers>()
        .map(|containers| containers.0.clone())
        .unwrap_or_default();
    let MountPlan { container, editor } = prepare_mount(&registry, selector, content)?;

    apply_theme(config.theme, cx);

    let bounds = Bounds::centered(None, size(px(container.width), px(container.height)), cx);
    let handle = cx.open_window(
        WindowOptions {
            titlebar: Some(TitlebarOptions {
                title: Some(container.title.clone().into()),
                appears_transparent: false,
                traffic_light_position: None,
            }),
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            ..Default::default()
        },
        |window, cx| {
            let view = EditorShell::view(editor, config, window, cx);
            cx.new(|cx| Root::new(view, window, cx))
        },
    )?;

    tracing::info!(selector, title = %container.title, "editor mounted");
    Ok(handle)
}
