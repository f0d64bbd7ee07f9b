use std::rc::Rc;

use gpui::prelude::FluentBuilder as _;
use gpui::{
    AnyElement, App, ClickEvent, ElementId, InteractiveElement as _, IntoElement, MouseButton,
    ParentElement, RenderOnce, SharedString, StatefulInteractiveElement as _, StyleRefinement,
    Styled, Window, div, px,
};
use gpui_component::tooltip::Tooltip;
use gpui_component::{ActiveTheme as _, Selectable, StyledExt as _};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MenuButtonShape {
    /// Square toolbar button.
    Compact,
    /// Full-width menu row.
    Row,
}

/// Clickable surface shared by the floating toolbar and the command menus.
///
/// Pressing it never takes focus away from the document.
#[derive(IntoElement)]
pub struct MenuButton {
    id: ElementId,
    style: StyleRefinement,
    shape: MenuButtonShape,
    tooltip: Option<SharedString>,
    selected: bool,
    children: Vec<AnyElement>,
    on_click: Option<Rc<dyn Fn(&ClickEvent, &mut Window, &mut App)>>,
    on_hover: Option<Rc<dyn Fn(&bool, &mut Window, &mut App)>>,
}

impl MenuButton {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            style: StyleRefinement::default(),
            shape: MenuButtonShape::Compact,
            tooltip: None,
            selected: false,
            children: Vec::new(),
            on_click: None,
            on_hover: None,
        }
    }

    pub fn row(id: impl Into<ElementId>) -> Self {
        Self {
            shape: MenuButtonShape::Row,
            ..Self::new(id)
        }
    }

    pub fn tooltip(mut self, tooltip: impl Into<SharedString>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn on_click(
        mut self,
        on_click: impl Fn(&ClickEvent, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_click = Some(Rc::new(on_click));
        self
    }

    pub fn on_hover(mut self, on_hover: impl Fn(&bool, &mut Window, &mut App) + 'static) -> Self {
        self.on_hover = Some(Rc::new(on_hover));
        self
    }
}

impl ParentElement for MenuButton {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements);
    }
}

impl Styled for MenuButton {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl Selectable for MenuButton {
    fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    fn is_selected(&self) -> bool {
        self.selected
    }
}

impl RenderOnce for MenuButton {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id(self.id)
            .flex()
            .items_center()
            .gap(px(8.))
            .text_color(theme.foreground)
            .cursor_pointer()
            .map(|this| match self.shape {
                MenuButtonShape::Compact => this
                    .justify_center()
                    .h(px(28.))
                    .min_w(px(28.))
                    .px(px(6.))
                    .rounded(px(6.))
                    .text_size(px(13.))
                    .font_weight(gpui::FontWeight::SEMIBOLD),
                MenuButtonShape::Row => this
                    .w_full()
                    .px(px(8.))
                    .py(px(6.))
                    .rounded(px(6.))
                    .text_size(px(13.)),
            })
            .hover(|this| this.bg(theme.muted))
            .when(self.selected, |this| {
                this.bg(theme.accent).text_color(theme.accent_foreground)
            })
            .refine_style(&self.style)
            // Keep the document focused while a menu is used.
            .on_mouse_down(MouseButton::Left, |_, window, _| window.prevent_default())
            .when_some(self.on_click, |this, on_click| {
                this.on_click(move |event, window, cx| on_click(event, window, cx))
            })
            .when_some(self.on_hover, |this, on_hover| {
                this.on_hover(move |hovered, window, cx| on_hover(hovered, window, cx))
            })
            .children(self.children)
            .when_some(self.tooltip, |this, tooltip| {
                this.tooltip(move |window, cx| Tooltip::new(tooltip.clone()).build(window, cx))
            })
    }
}

/// Text glyph shown beside a command in both menus.
pub fn command_glyph(command_id: &str) -> &'static str {
    match command_id {
        "heading1" => "H1",
        "heading2" => "H2",
        "heading3" => "H3",
        "bullet" => "•",
        "numbered" => "1.",
        "checklist" => "☐",
        "quote" => "❝",
        "code-block" => "</>",
        "divider" => "—",
        "table" => "▦",
        "image" => "▣",
        "video" => "▶",
        "link" => "↗",
        _ => "¶",
    }
}
