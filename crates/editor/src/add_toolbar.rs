use gpui::{
    App, InteractiveElement as _, IntoElement, MouseButton, ParentElement as _, RenderOnce,
    StatefulInteractiveElement as _, Styled as _, Window, anchored, deferred, div, point, px,
};
use gpui_component::{ActiveTheme as _, StyledExt as _};
use scriptum_commands::{AddMenuSection, Anchor};

use crate::menu_button::MenuButton;
use crate::slash_menu::{CommandHandler, PointerHandler, command_row};

/// The "+" menu: every command, grouped by category.
#[derive(IntoElement)]
pub struct AddToolbar {
    sections: Vec<AddMenuSection>,
    anchor: Anchor,
    on_select: CommandHandler,
    on_close: PointerHandler,
    on_pointer_down: PointerHandler,
}

impl AddToolbar {
    pub fn new(
        sections: Vec<AddMenuSection>,
        anchor: Anchor,
        on_select: CommandHandler,
        on_close: PointerHandler,
        on_pointer_down: PointerHandler,
    ) -> Self {
        Self {
            sections,
            anchor,
            on_select,
            on_close,
            on_pointer_down,
        }
    }
}

impl RenderOnce for AddToolbar {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme();

        let on_close = self.on_close;
        let header = div()
            .flex()
            .flex_row()
            .items_center()
            .justify_between()
            .px(px(8.))
            .py(px(6.))
            .border_b_1()
            .border_color(theme.border)
            .child(div().text_size(px(13.)).font_semibold().child("Add content"))
            .child(
                MenuButton::new("add-toolbar-close")
                    .tooltip("Close menu")
                    .on_click(move |_, window, cx| on_close(window, cx))
                    .child("✕"),
            );

        let sections = self.sections.iter().map(|section| {
            let rows = section.commands.iter().map(|command| {
                let id = command.id;
                let on_select = self.on_select.clone();
                MenuButton::row(id)
                    .on_click(move |_, window, cx| on_select(id, window, cx))
                    .child(command_row(command, theme))
            });
            div()
                .flex()
                .flex_col()
                .gap(px(2.))
                .child(
                    div()
                        .px(px(8.))
                        .pt(px(6.))
                        .text_size(px(11.))
                        .font_semibold()
                        .text_color(theme.muted_foreground)
                        .child(section.title.clone()),
                )
                .children(rows)
        });

        let on_pointer_down = self.on_pointer_down;
        deferred(
            anchored()
                .position(point(px(self.anchor.x), px(self.anchor.y)))
                .snap_to_window_with_margin(px(8.))
                .child(
                    div()
                        .id("add-toolbar")
                        .occlude()
                        .w(px(320.))
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
                        .child(header)
                        .child(
                            div()
                                .id("add-toolbar-content")
                                .max_h(px(420.))
                                .overflow_y_scroll()
                                .p(px(4.))
                                .flex()
                                .flex_col()
                                .gap(px(6.))
                                .children(sections),
                        ),
                ),
        )
        .with_priority(1)
    }
}
