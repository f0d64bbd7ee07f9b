use std::rc::Rc;

use gpui::*;
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::{ActiveTheme as _, Icon, IconName, Sizable as _, StyledExt as _, h_flex, v_flex};
use scriptum_commands::{
    Anchor, FormatAction, PointerTarget, ShellConfig, ShellKey, ShellState, add_menu_sections,
    mark_active,
};
use scriptum_core::{Editor, MarkKind};

use crate::add_toolbar::AddToolbar;
use crate::document_view::{DocumentEvent, DocumentView};
use crate::floating_toolbar::FloatingToolbar;
use crate::slash_menu::{CommandHandler, PointerHandler, SlashCommandMenu};
use crate::theme::apply_theme;

/// Distance below the "+" button where the add menu opens.
const ADD_MENU_DROP: f32 = 18.;

/// A mounted editor: header, document, command menus and footer.
pub struct EditorShell {
    state: ShellState,
    config: ShellConfig,
    document: Entity<DocumentView>,
    _subscriptions: Vec<Subscription>,
}

impl EditorShell {
    pub fn new(
        editor: Editor,
        config: ShellConfig,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let document = cx.new(|cx| DocumentView::new(editor, window, cx));
        let subscriptions = vec![cx.subscribe_in(&document, window, Self::on_document_event)];
        Self {
            state: ShellState::new(&config),
            config,
            document,
            _subscriptions: subscriptions,
        }
    }

    pub fn view(
        editor: Editor,
        config: ShellConfig,
        window: &mut Window,
        cx: &mut App,
    ) -> Entity<Self> {
        cx.new(|cx| Self::new(editor, config, window, cx))
    }

    pub fn document(&self) -> &Entity<DocumentView> {
        &self.document
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    fn on_document_event(
        &mut self,
        document: &Entity<DocumentView>,
        event: &DocumentEvent,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        match *event {
            DocumentEvent::TextInput => self.state.on_text_input(),
            DocumentEvent::Changed => self.state.on_state_change(document.read(cx)),
            DocumentEvent::PointerDown => {
                let editor = document.read(cx).editor();
                self.state.on_pointer_down(PointerTarget::Document, Some(editor));
            }
            DocumentEvent::Escape => self.send_key(ShellKey::Escape, cx),
            DocumentEvent::MenuKey(key) => self.send_key(key, cx),
            DocumentEvent::BlockHovered(block) => self.state.set_hovered_block(block),
        }
        self.sync_document(cx);
        cx.notify();
    }

    fn send_key(&mut self, key: ShellKey, cx: &mut Context<Self>) {
        let state = &mut self.state;
        self.document.update(cx, |doc, cx| {
            let handled = state.on_key_down(key, Some(doc));
            tracing::trace!(?key, handled, "shell key");
            doc.flush(cx);
        });
    }

    /// Arrow keys and Enter belong to the slash menu while it shows matches.
    fn sync_document(&mut self, cx: &mut Context<Self>) {
        let capture = self.state.slash_menu_view().is_some();
        self.document.update(cx, |doc, _| doc.set_menu_keys(capture));
    }

    fn pointer_down(&mut self, target: PointerTarget, cx: &mut Context<Self>) {
        let editor = self.document.read(cx).editor();
        self.state.on_pointer_down(target, Some(editor));
        self.sync_document(cx);
        cx.notify();
    }

    fn focus_document(&self, window: &mut Window, cx: &mut Context<Self>) {
        let handle = self.document.read(cx).focus_handle();
        window.focus(&handle);
    }

    fn select_command(&mut self, id: &'static str, window: &mut Window, cx: &mut Context<Self>) {
        let state = &mut self.state;
        self.document.update(cx, |doc, cx| {
            state.select_command(id, Some(doc));
            doc.flush(cx);
        });
        self.focus_document(window, cx);
        self.sync_document(cx);
        cx.notify();
    }

    fn apply_format(&mut self, action: FormatAction, window: &mut Window, cx: &mut Context<Self>) {
        let state = &mut self.state;
        self.document.update(cx, |doc, cx| {
            state.apply_format_action(action, Some(doc));
            doc.flush(cx);
        });
        self.focus_document(window, cx);
        cx.notify();
    }

    fn toggle_add_menu(&mut self, position: gpui::Point<Pixels>, cx: &mut Context<Self>) {
        let anchor = Anchor::new(f32::from(position.x), f32::from(position.y) + ADD_MENU_DROP);
        let editor = self.document.read(cx).editor();
        self.state.toggle_add_menu(anchor, Some(editor));
        self.sync_document(cx);
        cx.notify();
    }

    fn close_add_menu(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.pointer_down(PointerTarget::Chrome, cx);
        self.focus_document(window, cx);
    }

    fn toggle_theme(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let theme = self.state.toggle_theme();
        apply_theme(theme, cx);
        self.focus_document(window, cx);
        cx.notify();
    }

    fn command_handler(&self, cx: &mut Context<Self>) -> CommandHandler {
        let this = cx.entity().downgrade();
        Rc::new(move |id: &'static str, window: &mut Window, cx: &mut App| {
            _ = this.update(cx, |this, cx| this.select_command(id, window, cx));
        })
    }

    fn pointer_handler(&self, target: PointerTarget, cx: &mut Context<Self>) -> PointerHandler {
        let this = cx.entity().downgrade();
        Rc::new(move |_: &mut Window, cx: &mut App| {
            _ = this.update(cx, |this, cx| this.pointer_down(target, cx));
        })
    }

    fn render_header(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme().clone();
        let dark = self.state.theme().is_dark();
        let next = self.state.theme().toggled();

        h_flex()
            .justify_between()
            .px(px(20.))
            .py(px(10.))
            .border_b_1()
            .border_color(theme.border)
            .child(
                v_flex()
                    .gap(px(2.))
                    .child(
                        div()
                            .text_size(px(15.))
                            .font_semibold()
                            .child(self.config.document_title.clone()),
                    )
                    .child(
                        h_flex()
                            .gap(px(4.))
                            .text_size(px(12.))
                            .text_color(theme.muted_foreground)
                            .child(self.config.workspace_name.clone())
                            .child(Icon::new(IconName::ChevronRight).xsmall())
                            .child(self.config.document_title.clone()),
                    ),
            )
            .child(
                h_flex()
                    .gap(px(4.))
                    .child(
                        Button::new("theme-toggle")
                            .icon(if dark { IconName::Sun } else { IconName::Moon })
                            .small()
                            .ghost()
                            .tooltip(format!("Switch to {} mode", next.as_str()))
                            .on_click(cx.listener(|this, _, window, cx| {
                                this.toggle_theme(window, cx);
                            })),
                    )
                    .child(Button::new("more").icon(IconName::Ellipsis).small().ghost()),
            )
    }

    fn render_footer(&self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme().clone();
        h_flex()
            .justify_between()
            .px(px(20.))
            .py(px(8.))
            .border_t_1()
            .border_color(theme.border)
            .text_size(px(12.))
            .text_color(theme.muted_foreground)
            .child(
                h_flex()
                    .gap(px(6.))
                    .child(Icon::new(IconName::Search).xsmall())
                    .child(self.config.footer_hint.clone()),
            )
            .child(if self.document.read(cx).editor().can_undo() {
                "Edited"
            } else {
                "No changes"
            })
    }
}

impl Render for EditorShell {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme().clone();

        let add_menu = self.state.add_menu().active.then(|| {
            AddToolbar::new(
                add_menu_sections(self.state.registry()),
                self.state.add_menu().anchor,
                self.command_handler(cx),
                {
                    let this = cx.entity().downgrade();
                    Rc::new(move |window: &mut Window, cx: &mut App| {
                        _ = this.update(cx, |this, cx| this.close_add_menu(window, cx));
                    })
                },
                self.pointer_handler(PointerTarget::AddMenu, cx),
            )
        });

        let slash_menu = self.state.slash_menu_view().map(|menu| {
            let this = cx.entity().downgrade();
            SlashCommandMenu::new(
                menu,
                self.state.slash_menu().anchor,
                self.config.slash_menu_offset,
                self.command_handler(cx),
                Rc::new(move |ix: usize, _: &mut Window, cx: &mut App| {
                    _ = this.update(cx, |this, cx| {
                        this.state.highlight(ix);
                        cx.notify();
                    });
                }),
                self.pointer_handler(PointerTarget::SlashMenu, cx),
            )
        });

        let toolbar = *self.state.selection_toolbar();
        let floating_toolbar = toolbar.visible.then(|| {
            let document = self.document.read(cx);
            let active = [MarkKind::Bold, MarkKind::Italic, MarkKind::Code]
                .into_iter()
                .filter(|mark| mark_active(*mark, document))
                .collect();
            let this = cx.entity().downgrade();
            FloatingToolbar::new(
                toolbar.anchor,
                self.config.toolbar_offset,
                active,
                Rc::new(move |action: FormatAction, window: &mut Window, cx: &mut App| {
                    _ = this.update(cx, |this, cx| this.apply_format(action, window, cx));
                }),
                self.pointer_handler(PointerTarget::FloatingToolbar, cx),
            )
        });

        v_flex()
            .id("scriptum-shell")
            .size_full()
            .bg(theme.background)
            .text_color(theme.foreground)
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _, cx| this.pointer_down(PointerTarget::Chrome, cx)),
            )
            .child(self.render_header(cx))
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .items_start()
                    .child(
                        div()
                            .id("add-button")
                            .flex_none()
                            .m(px(12.))
                            .size(px(28.))
                            .flex()
                            .items_center()
                            .justify_center()
                            .rounded(theme.radius)
                            .border_1()
                            .border_color(theme.border)
                            .text_color(theme.muted_foreground)
                            .cursor_pointer()
                            .hover(|this| this.bg(theme.muted))
                            .child(Icon::new(IconName::Plus).small())
                            .on_mouse_down(
                                MouseButton::Left,
                                cx.listener(|this, event: &MouseDownEvent, window, cx| {
                                    cx.stop_propagation();
                                    window.prevent_default();
                                    this.toggle_add_menu(event.position, cx);
                                }),
                            ),
                    )
                    .child(
                        div()
                            .flex_1()
                            .h_full()
                            .min_w(px(0.))
                            .child(self.document.clone()),
                    ),
            )
            .child(self.render_footer(cx))
            .children(add_menu)
            .children(slash_menu)
            .children(floating_toolbar)
    }
}
