use std::rc::Rc;

use gpui::prelude::FluentBuilder as _;
use gpui::{
    App, FontWeight, InteractiveElement as _, IntoElement, MouseButton, ParentElement as _,
    RenderOnce, Styled as _, Window, anchored, deferred, div, point, px,
};
use gpui_component::{ActiveTheme as _, Selectable as _};
use scriptum_commands::{Anchor, FLOATING_TOOLBAR_BUTTONS, FormatAction};
use scriptum_core::MarkKind;

use crate::menu_button::MenuButton;
use crate::slash_menu::PointerHandler;

/// Approximate rendered width, used to center the toolbar over its anchor.
const TOOLBAR_WIDTH: f32 = 164.;

/// Mark buttons floating above a non-empty selection.
#[derive(IntoElement)]
pub struct FloatingToolbar {
    anchor: Anchor,
    offset: f32,
    active: Vec<MarkKind>,
    on_press: Rc<dyn Fn(FormatAction, &mut Window, &mut App)>,
    on_pointer_down: PointerHandler,
}

impl FloatingToolbar {
    pub fn new(
        anchor: Anchor,
        offset: f32,
        active: Vec<MarkKind>,
        on_press: Rc<dyn Fn(FormatAction, &mut Window, &mut App)>,
        on_pointer_down: PointerHandler,
    ) -> Self {
        Self {
            anchor,
            offset,
            active,
            on_press,
            on_pointer_down,
        }
    }
}

impl RenderOnce for FloatingToolbar {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme();
        let mono = theme.mono_font_family.clone();

        let mut buttons = div().flex().flex_row().items_center().gap(px(2.));
        for button in FLOATING_TOOLBAR_BUTTONS {
            let action = button.action;
            if action == FormatAction::Link {
                buttons = buttons.child(div().w(px(1.)).h(px(18.)).mx(px(2.)).bg(theme.border));
            }
            let on_press = self.on_press.clone();
            let selected = matches!(action, FormatAction::Mark(mark) if self.active.contains(&mark));
            buttons = buttons.child(
                MenuButton::new(button.id)
                    .tooltip(button.tooltip)
                    .selected(selected)
                    .map(|this| match action {
                        FormatAction::Mark(MarkKind::Bold) => this.font_weight(FontWeight::BOLD),
                        FormatAction::Mark(MarkKind::Italic) => this.italic(),
                        FormatAction::Mark(MarkKind::Code) => this.font_family(mono.clone()),
                        FormatAction::Link => this,
                    })
                    .on_click(move |_, window, cx| on_press(action, window, cx))
                    .child(button.label),
            );
        }

        let on_pointer_down = self.on_pointer_down;
        let position = point(
            px(self.anchor.x - TOOLBAR_WIDTH / 2.),
            px(self.anchor.y - self.offset),
        );
        deferred(
            anchored()
                .position(position)
                .snap_to_window_with_margin(px(8.))
                .child(
                    div()
                        .id("floating-toolbar")
                        .occlude()
                        .p(px(4.))
                        .bg(theme.popover)
                        .text_color(theme.popover_foreground)
                        .border_1()
                        .border_color(theme.border)
                        .rounded(theme.radius)
                        .shadow_md()
                        .on_mouse_down(MouseButton::Left, move |_, window, cx| {
                            on_pointer_down(window, cx);
                            cx.stop_propagation();
                        })
                        .child(buttons),
                ),
        )
        .with_priority(1)
    }
}
