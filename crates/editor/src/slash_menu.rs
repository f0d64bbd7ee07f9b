use std::rc::Rc;

use gpui::{
    App, InteractiveElement as _, IntoElement, MouseButton, ParentElement as _, RenderOnce,
    StatefulInteractiveElement as _, Styled as _, Window, anchored, deferred, div, point, px,
};
use gpui_component::{ActiveTheme as _, Selectable as _, Theme};
use scriptum_commands::{Anchor, Command, SlashMenu};

use crate::menu_button::{MenuButton, command_glyph};

pub type CommandHandler = Rc<dyn Fn(&'static str, &mut Window, &mut App)>;
pub type PointerHandler = Rc<dyn Fn(&mut Window, &mut App)>;

/// Filtered command list that follows the cursor while a slash trigger is
/// live.
#[derive(IntoElement)]
pub struct SlashCommandMenu {
    menu: SlashMenu,
    anchor: Anchor,
    offset: f32,
    on_select: CommandHandler,
    on_highlight: Rc<dyn Fn(usize, &mut Window, &mut App)>,
    on_pointer_down: PointerHandler,
}

impl SlashCommandMenu {
    pub fn new(
        menu: SlashMenu,
        anchor: Anchor,
        offset: f32,
        on_select: CommandHandler,
        on_highlight: Rc<dyn Fn(usize, &mut Window, &mut App)>,
        on_pointer_down: PointerHandler,
    ) -> Self {
        Self {
            menu,
            anchor,
            offset,
            on_select,
            on_highlight,
            on_pointer_down,
        }
    }
}

pub(crate) fn command_row(command: &Command, theme: &Theme) -> impl IntoElement {
    div()
        .flex()
        .flex_row()
        .items_center()
        .gap(px(10.))
        .child(
            div()
                .flex_none()
                .w(px(32.))
                .h(px(32.))
                .flex()
                .items_center()
                .justify_center()
                .rounded(px(6.))
                .border_1()
                .border_color(theme.border)
                .bg(theme.background)
                .text_size(px(12.))
                .child(command_glyph(command.id)),
        )
        .child(
            div()
                .flex()
                .flex_col()
                .child(div().text_size(px(13.)).child(command.label))
                .children(command.description.map(|description| {
                    div()
                        .text_size(px(11.))
                        .text_color(theme.muted_foreground)
                        .child(description)
                })),
        )
}

impl RenderOnce for SlashCommandMenu {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme();
        let highlighted = self.menu.highlighted;

        let rows = self.menu.matches.iter().enumerate().map(|(ix, command)| {
            let id = command.id;
            let on_select = self.on_select.clone();
            let on_highlight = self.on_highlight.clone();
            MenuButton::row(("slash-command", ix))
                .selected(ix == highlighted)
                .on_click(move |_, window, cx| on_select(id, window, cx))
                .on_hover(move |hovered, window, cx| {
                    if *hovered {
                        on_highlight(ix, window, cx);
                    }
                })
                .child(command_row(command, theme))
        });

        let on_pointer_down = self.on_pointer_down;
        let position = point(px(self.anchor.x), px(self.anchor.y + self.offset));
        deferred(
            anchored()
                .position(position)
                .snap_to_window_with_margin(px(8.))
                .child(
                    div()
                        .id("slash-menu")
                        .occlude()
                        .w(px(300.))
                        .max_h(px(360.))
                        .overflow_y_scroll()
                        .p(px(4.))
                        .flex()
                        .flex_col()
                        .gap(px(2.))
                        .bg(theme.popover)
                        .text_color(theme.popover_foreground)
                        .border_1()
                        .border_color(theme.border)
                        .rounded(theme.radius)
                        .shadow_lg()
                        .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                            on_pointer_down(window, cx);
                            cx.stop_propagation();
                        })
                        .children(rows),
                ),
        )
        .with_priority(1)
    }
}
