use gpui::{
    App, InteractiveElement as _, IntoElement, ParentElement as _, RenderOnce, Styled as _, Window,
    div, px,
};
use gpui_component::ActiveTheme as _;

/// Grip shown in the gutter of the hovered top-level block.
#[derive(IntoElement)]
pub struct BlockHandle {
    block: usize,
}

impl BlockHandle {
    pub fn new(block: usize) -> Self {
        Self { block }
    }
}

impl RenderOnce for BlockHandle {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id(("block-handle", self.block))
            .absolute()
            .left(px(4.))
            .top(px(2.))
            .w(px(18.))
            .h(px(22.))
            .flex()
            .items_center()
            .justify_center()
            .rounded(px(4.))
            .text_size(px(12.))
            .text_color(theme.muted_foreground)
            .bg(theme.muted)
            .child("⋮⋮")
    }
}
