use std::collections::HashMap;
use std::ops::Range;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme as _, Theme};
use scriptum_commands::{Coords, EditorView, ShellKey, toggle_mark};
use scriptum_core::{
    ApplyError, EditError, Editor, ElementNode, MarkKind, Marks, Node, Path, Point as DocPoint,
    Selection, Transaction, delete_backward, delete_forward, delete_selection, element_at_path,
    insert_text, ordered_selection_points, point_for_global_offset, split_block, text_len,
};

use crate::block_handle::BlockHandle;

pub(crate) const CONTEXT: &str = "ScriptumDocument";

/// Left gutter of every top-level block, where the block handle sits.
const HANDLE_GUTTER: f32 = 28.;

actions!(
    scriptum_document,
    [
        Backspace,
        Delete,
        Enter,
        MoveLeft,
        MoveRight,
        MoveUp,
        MoveDown,
        SelectLeft,
        SelectRight,
        SelectAll,
        Undo,
        Redo,
        Escape,
        ToggleBold,
        ToggleItalic,
        ToggleCode,
    ]
);

pub fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("backspace", Backspace, Some(CONTEXT)),
        KeyBinding::new("delete", Delete, Some(CONTEXT)),
        KeyBinding::new("enter", Enter, Some(CONTEXT)),
        KeyBinding::new("left", MoveLeft, Some(CONTEXT)),
        KeyBinding::new("right", MoveRight, Some(CONTEXT)),
        KeyBinding::new("up", MoveUp, Some(CONTEXT)),
        KeyBinding::new("down", MoveDown, Some(CONTEXT)),
        KeyBinding::new("shift-left", SelectLeft, Some(CONTEXT)),
        KeyBinding::new("shift-right", SelectRight, Some(CONTEXT)),
        KeyBinding::new("escape", Escape, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-a", SelectAll, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-a", SelectAll, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-z", Undo, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-z", Undo, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-shift-z", Redo, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-shift-z", Redo, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-b", ToggleBold, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-b", ToggleBold, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-i", ToggleItalic, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-i", ToggleItalic, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-e", ToggleCode, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-e", ToggleCode, Some(CONTEXT)),
    ]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// Text is about to be inserted from the keyboard or an IME.
    TextInput,
    /// The document or the selection changed.
    Changed,
    PointerDown,
    Escape,
    /// A navigation key arrived while a menu owns the keyboard.
    MenuKey(ShellKey),
    BlockHovered(Option<usize>),
}

#[derive(Clone)]
struct LineLayout {
    bounds: Bounds<Pixels>,
    text_layout: TextLayout,
    len: usize,
}

/// The editable document surface.
///
/// Owns the [`Editor`] and paints every text block as its own line element;
/// geometry from the last frame is kept per block path for hit testing and
/// for [`EditorView::coords_at`].
pub struct DocumentView {
    focus_handle: FocusHandle,
    editor: Editor,
    layouts: HashMap<Path, LineLayout>,
    scroll_handle: ScrollHandle,
    ime_marked_range: Option<Range<usize>>,
    selecting: bool,
    menu_keys: bool,
    hovered_block: Option<usize>,
    changed: bool,
    scroll_requested: bool,
    did_auto_focus: bool,
}

impl EventEmitter<DocumentEvent> for DocumentView {}

impl DocumentView {
    pub fn new(editor: Editor, _window: &mut Window, cx: &mut Context<Self>) -> Self {
        Self {
            focus_handle: cx.focus_handle().tab_stop(true),
            editor,
            layouts: HashMap::new(),
            scroll_handle: ScrollHandle::new(),
            ime_marked_range: None,
            selecting: false,
            menu_keys: false,
            hovered_block: None,
            changed: false,
            scroll_requested: false,
            did_auto_focus: false,
        }
    }

    pub fn focus_handle(&self) -> FocusHandle {
        self.focus_handle.clone()
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// While set, Up, Down and Enter are reported as [`DocumentEvent::MenuKey`]
    /// instead of moving the cursor.
    pub fn set_menu_keys(&mut self, capture: bool) {
        self.menu_keys = capture;
    }

    pub fn set_hovered_block(&mut self, block: Option<usize>, cx: &mut Context<Self>) {
        if self.hovered_block != block {
            self.hovered_block = block;
            cx.notify();
        }
    }

    /// Publishes pending changes to subscribers and repaints.
    pub fn flush(&mut self, cx: &mut Context<Self>) {
        if !std::mem::take(&mut self.changed) {
            return;
        }
        cx.emit(DocumentEvent::Changed);
        cx.notify();
    }

    fn point_in_block(&self, block_path: &[usize], offset: usize) -> Option<DocPoint> {
        let el = element_at_path(self.editor.doc(), block_path)?;
        Some(point_for_global_offset(block_path, &el.children, offset))
    }

    /// Focus block path, its text and the selected byte range inside it.
    /// Selections leaving the block are reported as the bare focus.
    fn focus_block_range(&self) -> Option<(Path, String, Range<usize>)> {
        let focus = self.editor.resolved_focus()?;
        let range = match self.editor.resolve(&self.editor.selection().anchor) {
            Some(anchor) if anchor.block_path == focus.block_path => {
                anchor.offset.min(focus.offset)..anchor.offset.max(focus.offset)
            }
            _ => focus.offset..focus.offset,
        };
        Some((focus.block_path, focus.text, range))
    }

    fn select(&mut self, anchor: DocPoint, focus: DocPoint, cx: &mut Context<Self>) {
        self.editor.set_selection(Selection { anchor, focus });
        self.ime_marked_range = None;
        self.changed = true;
        self.flush(cx);
    }

    fn push_tx(&mut self, tx: Transaction, cx: &mut Context<Self>) {
        if let Err(err) = self.dispatch(tx) {
            tracing::warn!("transaction rejected: {err}");
        }
        self.flush(cx);
    }

    fn push_edit(&mut self, edit: Result<Option<Transaction>, EditError>, cx: &mut Context<Self>) {
        match edit {
            Ok(Some(tx)) => self.push_tx(tx.scroll_into_view(), cx),
            Ok(None) => self.flush(cx),
            Err(err) => {
                tracing::debug!("edit skipped: {err}");
                self.flush(cx);
            }
        }
    }

    /// Replaces a byte range of one block with `text`.
    fn replace_in_block(
        &mut self,
        block_path: &[usize],
        range: Range<usize>,
        text: &str,
        cx: &mut Context<Self>,
    ) {
        let (Some(start), Some(end)) = (
            self.point_in_block(block_path, range.start),
            self.point_in_block(block_path, range.end),
        ) else {
            return;
        };
        self.editor.set_selection(Selection {
            anchor: start,
            focus: end,
        });
        self.changed = true;
        self.replace_selection(text, cx);
    }

    fn replace_selection(&mut self, text: &str, cx: &mut Context<Self>) {
        let edit = if text.is_empty() {
            delete_selection(&self.editor)
        } else {
            insert_text(&self.editor, text).map(Some)
        };
        self.push_edit(edit, cx);
    }

    fn step_left(&self, point: &DocPoint) -> Option<DocPoint> {
        let pos = self.editor.resolve(point)?;
        if pos.offset > 0 {
            return self.point_in_block(&pos.block_path, prev_boundary(&pos.text, pos.offset));
        }
        let blocks = self.editor.text_blocks();
        let ix = blocks.iter().position(|b| b.path == pos.block_path)?;
        let prev = blocks.get(ix.checked_sub(1)?)?;
        let end = text_len(&prev.el.children);
        Some(point_for_global_offset(&prev.path, &prev.el.children, end))
    }

    fn step_right(&self, point: &DocPoint) -> Option<DocPoint> {
        let pos = self.editor.resolve(point)?;
        if pos.offset < pos.text.len() {
            return self.point_in_block(&pos.block_path, next_boundary(&pos.text, pos.offset));
        }
        let blocks = self.editor.text_blocks();
        let ix = blocks.iter().position(|b| b.path == pos.block_path)?;
        let next = blocks.get(ix + 1)?;
        Some(point_for_global_offset(&next.path, &next.el.children, 0))
    }

    /// Same horizontal position in the neighbouring text block.
    fn step_vertical(&self, point: &DocPoint, down: bool) -> Option<DocPoint> {
        let pos = self.editor.resolve(point)?;
        let blocks = self.editor.text_blocks();
        let ix = blocks.iter().position(|b| b.path == pos.block_path)?;
        let target = if down {
            blocks.get(ix + 1)?
        } else {
            blocks.get(ix.checked_sub(1)?)?
        };
        let target_len = text_len(&target.el.children);

        let offset = match (self.layouts.get(&pos.block_path), self.layouts.get(&target.path)) {
            (Some(from), Some(to)) => {
                let x = from
                    .text_layout
                    .position_for_index(pos.offset.min(from.len))
                    .map_or(to.bounds.left(), |p| p.x);
                let probe = gpui::point(x, to.bounds.top() + to.text_layout.line_height() / 2.);
                match to.text_layout.index_for_position(probe) {
                    Ok(ix) | Err(ix) => ix.min(target_len),
                }
            }
            _ => pos.offset.min(target_len),
        };
        Some(point_for_global_offset(&target.path, &target.el.children, offset))
    }

    fn backspace(&mut self, _: &Backspace, _: &mut Window, cx: &mut Context<Self>) {
        let edit = delete_backward(&self.editor);
        self.push_edit(edit, cx);
    }

    fn delete(&mut self, _: &Delete, _: &mut Window, cx: &mut Context<Self>) {
        let edit = delete_forward(&self.editor);
        self.push_edit(edit, cx);
    }

    fn enter(&mut self, _: &Enter, _: &mut Window, cx: &mut Context<Self>) {
        if self.menu_keys {
            cx.emit(DocumentEvent::MenuKey(ShellKey::Enter));
            return;
        }
        let edit = split_block(&self.editor).map(Some);
        self.push_edit(edit, cx);
    }

    fn left(&mut self, _: &MoveLeft, _: &mut Window, cx: &mut Context<Self>) {
        let sel = self.editor.selection().clone();
        if !sel.is_collapsed() {
            let (start, _) = ordered_selection_points(&sel);
            self.select(start.clone(), start, cx);
            return;
        }
        if let Some(target) = self.step_left(&sel.focus) {
            self.select(target.clone(), target, cx);
        }
    }

    fn right(&mut self, _: &MoveRight, _: &mut Window, cx: &mut Context<Self>) {
        let sel = self.editor.selection().clone();
        if !sel.is_collapsed() {
            let (_, end) = ordered_selection_points(&sel);
            self.select(end.clone(), end, cx);
            return;
        }
        if let Some(target) = self.step_right(&sel.focus) {
            self.select(target.clone(), target, cx);
        }
    }

    fn up(&mut self, _: &MoveUp, _: &mut Window, cx: &mut Context<Self>) {
        if self.menu_keys {
            cx.emit(DocumentEvent::MenuKey(ShellKey::ArrowUp));
            return;
        }
        let focus = self.editor.selection().focus.clone();
        if let Some(target) = self.step_vertical(&focus, false) {
            self.select(target.clone(), target, cx);
        }
    }

    fn down(&mut self, _: &MoveDown, _: &mut Window, cx: &mut Context<Self>) {
        if self.menu_keys {
            cx.emit(DocumentEvent::MenuKey(ShellKey::ArrowDown));
            return;
        }
        let focus = self.editor.selection().focus.clone();
        if let Some(target) = self.step_vertical(&focus, true) {
            self.select(target.clone(), target, cx);
        }
    }

    fn select_left(&mut self, _: &SelectLeft, _: &mut Window, cx: &mut Context<Self>) {
        let sel = self.editor.selection().clone();
        if let Some(focus) = self.step_left(&sel.focus) {
            self.select(sel.anchor, focus, cx);
        }
    }

    fn select_right(&mut self, _: &SelectRight, _: &mut Window, cx: &mut Context<Self>) {
        let sel = self.editor.selection().clone();
        if let Some(focus) = self.step_right(&sel.focus) {
            self.select(sel.anchor, focus, cx);
        }
    }

    fn select_all(&mut self, _: &SelectAll, _: &mut Window, cx: &mut Context<Self>) {
        let blocks = self.editor.text_blocks();
        let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
            return;
        };
        let anchor = point_for_global_offset(&first.path, &first.el.children, 0);
        let end = text_len(&last.el.children);
        let focus = point_for_global_offset(&last.path, &last.el.children, end);
        self.select(anchor, focus, cx);
    }

    fn undo(&mut self, _: &Undo, _: &mut Window, cx: &mut Context<Self>) {
        if self.editor.undo() {
            self.changed = true;
            self.scroll_requested = true;
            self.flush(cx);
        }
    }

    fn redo(&mut self, _: &Redo, _: &mut Window, cx: &mut Context<Self>) {
        if self.editor.redo() {
            self.changed = true;
            self.scroll_requested = true;
            self.flush(cx);
        }
    }

    fn escape(&mut self, _: &Escape, _: &mut Window, cx: &mut Context<Self>) {
        cx.emit(DocumentEvent::Escape);
    }

    fn toggle_bold(&mut self, _: &ToggleBold, _: &mut Window, cx: &mut Context<Self>) {
        self.toggle(MarkKind::Bold, cx);
    }

    fn toggle_italic(&mut self, _: &ToggleItalic, _: &mut Window, cx: &mut Context<Self>) {
        self.toggle(MarkKind::Italic, cx);
    }

    fn toggle_code(&mut self, _: &ToggleCode, _: &mut Window, cx: &mut Context<Self>) {
        self.toggle(MarkKind::Code, cx);
    }

    fn toggle(&mut self, mark: MarkKind, cx: &mut Context<Self>) {
        toggle_mark(mark, Some(self));
        self.flush(cx);
    }

    /// The text block line nearest to `position`, and the byte offset in it.
    fn hit_test(&self, position: gpui::Point<Pixels>) -> Option<(Path, usize)> {
        let mut best: Option<(&Path, &LineLayout, Pixels)> = None;
        for (path, line) in &self.layouts {
            let distance = if position.y < line.bounds.top() {
                line.bounds.top() - position.y
            } else if position.y > line.bounds.bottom() {
                position.y - line.bounds.bottom()
            } else {
                px(0.)
            };
            if best.is_none_or(|(_, _, d)| distance < d) {
                best = Some((path, line, distance));
            }
        }
        let (path, line, _) = best?;
        let offset = match line.text_layout.index_for_position(position) {
            Ok(ix) | Err(ix) => ix.min(line.len),
        };
        Some((path.clone(), offset))
    }

    fn mouse_down(&mut self, position: gpui::Point<Pixels>, extend: bool, cx: &mut Context<Self>) {
        cx.emit(DocumentEvent::PointerDown);
        let Some((path, offset)) = self.hit_test(position) else {
            return;
        };
        let Some(focus) = self.point_in_block(&path, offset) else {
            return;
        };
        let anchor = if extend {
            self.editor.selection().anchor.clone()
        } else {
            focus.clone()
        };
        self.selecting = true;
        self.select(anchor, focus, cx);
    }

    fn drag_to(&mut self, position: gpui::Point<Pixels>, cx: &mut Context<Self>) {
        let Some((path, offset)) = self.hit_test(position) else {
            return;
        };
        let Some(focus) = self.point_in_block(&path, offset) else {
            return;
        };
        if focus != self.editor.selection().focus {
            let anchor = self.editor.selection().anchor.clone();
            self.select(anchor, focus, cx);
        }
    }

    fn hover_at(&mut self, position: Option<gpui::Point<Pixels>>, cx: &mut Context<Self>) {
        let block = position.and_then(|position| {
            self.layouts
                .iter()
                .find(|(_, line)| {
                    position.y >= line.bounds.top() && position.y <= line.bounds.bottom()
                })
                .and_then(|(path, _)| path.first().copied())
        });
        if block != self.hovered_block {
            self.hovered_block = block;
            cx.emit(DocumentEvent::BlockHovered(block));
            cx.notify();
        }
    }

    fn scroll_cursor_into_view(&mut self, cx: &mut Context<Self>) {
        let Some(caret) = self.coords_at(&self.editor.selection().focus) else {
            return;
        };
        let viewport = self.scroll_handle.bounds();
        let mut offset = self.scroll_handle.offset();

        let margin = px(12.);
        let (top, bottom) = (px(caret.top), px(caret.bottom));
        if top < viewport.top() + margin {
            offset.y += (viewport.top() + margin) - top;
        } else if bottom > viewport.bottom() - margin {
            offset.y -= bottom - (viewport.bottom() - margin);
        }

        self.scroll_handle.set_offset(offset);
        cx.notify();
    }

    /// Selected byte range per text block.
    fn selection_ranges(&self) -> HashMap<Path, Range<usize>> {
        let mut out = HashMap::new();
        let sel = self.editor.selection();
        if sel.is_collapsed() {
            return out;
        }
        let (from, to) = ordered_selection_points(sel);
        let (Some(from), Some(to)) = (self.editor.resolve(&from), self.editor.resolve(&to)) else {
            return out;
        };
        let blocks = self.editor.text_blocks();
        let first = blocks.iter().position(|b| b.path == from.block_path);
        let last = blocks.iter().position(|b| b.path == to.block_path);
        let (Some(first), Some(last)) = (first, last) else {
            return out;
        };
        if first > last {
            return out;
        }
        for block in &blocks[first..=last] {
            let start = if block.path == from.block_path { from.offset } else { 0 };
            let end = if block.path == to.block_path {
                to.offset
            } else {
                text_len(&block.el.children)
            };
            if start < end {
                out.insert(block.path.clone(), start..end);
            }
        }
        out
    }

    fn render_node(&self, node: &Node, path: Path, rcx: &RenderCx) -> AnyElement {
        let theme = &rcx.theme;
        match node {
            Node::Element(el) => match el.kind.as_str() {
                "paragraph" => self.line(path, el, rcx).into_any_element(),
                "heading" => {
                    let size = match el.heading_level().unwrap_or(1) {
                        1 => 28.,
                        2 => 22.,
                        _ => 18.,
                    };
                    div()
                        .pt(px(6.))
                        .text_size(px(size))
                        .font_weight(FontWeight::BOLD)
                        .child(self.line(path, el, rcx))
                        .into_any_element()
                }
                "code_block" => div()
                    .px(px(12.))
                    .py(px(8.))
                    .rounded(theme.radius)
                    .bg(theme.muted)
                    .font_family(theme.mono_font_family.clone())
                    .text_size(px(13.))
                    .child(self.line(path, el, rcx))
                    .into_any_element(),
                "blockquote" => div()
                    .flex()
                    .flex_row()
                    .gap(px(12.))
                    .child(div().w(px(3.)).bg(theme.border).rounded(px(2.)))
                    .child(
                        div()
                            .flex_1()
                            .flex()
                            .flex_col()
                            .gap(px(4.))
                            .text_color(theme.muted_foreground)
                            .italic()
                            .children(self.render_children(el, &path, rcx)),
                    )
                    .into_any_element(),
                "bullet_list" | "ordered_list" => {
                    let ordered = el.kind == "ordered_list";
                    let items = el.children.iter().enumerate().map(|(ix, item)| {
                        let marker = if ordered {
                            format!("{}.", ix + 1)
                        } else {
                            "•".to_string()
                        };
                        let mut item_path = path.clone();
                        item_path.push(ix);
                        self.render_list_item(item, item_path, marker, rcx)
                    });
                    div()
                        .flex()
                        .flex_col()
                        .gap(px(4.))
                        .children(items)
                        .into_any_element()
                }
                "list_item" => self.render_list_item(node, path, "•".to_string(), rcx),
                _ => unknown_node(theme, &path),
            },
            Node::Void(v) if v.kind == "divider" => div()
                .py(px(8.))
                .child(div().w_full().h(px(1.)).bg(theme.border))
                .into_any_element(),
            _ => unknown_node(theme, &path),
        }
    }

    fn render_children(&self, el: &ElementNode, path: &[usize], rcx: &RenderCx) -> Vec<AnyElement> {
        el.children
            .iter()
            .enumerate()
            .map(|(ix, child)| {
                let mut child_path = path.to_vec();
                child_path.push(ix);
                self.render_node(child, child_path, rcx)
            })
            .collect()
    }

    fn render_list_item(
        &self,
        node: &Node,
        path: Path,
        marker: String,
        rcx: &RenderCx,
    ) -> AnyElement {
        let content = match node {
            Node::Element(el) if el.kind == "list_item" => self.render_children(el, &path, rcx),
            other => vec![self.render_node(other, path, rcx)],
        };
        div()
            .flex()
            .flex_row()
            .gap(px(6.))
            .child(
                div()
                    .flex_none()
                    .w(px(20.))
                    .text_color(rcx.theme.muted_foreground)
                    .child(marker),
            )
            .child(div().flex_1().flex().flex_col().gap(px(4.)).children(content))
            .into_any_element()
    }

    fn line(&self, path: Path, el: &ElementNode, rcx: &RenderCx) -> BlockLine {
        let mut text = String::new();
        let mut leaves = Vec::new();
        for child in &el.children {
            if let Node::Text(t) = child
                && !t.text.is_empty()
            {
                text.push_str(&t.text);
                leaves.push((t.text.len(), t.marks));
            }
        }

        let is_focus_block = rcx.caret_block.as_deref() == Some(path.as_slice());
        BlockLine {
            state: rcx.state.clone(),
            selected: rcx.selected.get(&path).cloned(),
            caret: rcx.caret.filter(|_| is_focus_block),
            marked: self.ime_marked_range.clone().filter(|_| is_focus_block),
            path,
            text: text.into(),
            leaves,
            mono_font: rcx.theme.mono_font_family.clone(),
            code_bg: rcx.theme.muted,
            selection_color: rcx.theme.selection,
            styled_text: StyledText::new(SharedString::default()),
        }
    }
}

struct RenderCx {
    state: Entity<DocumentView>,
    theme: Theme,
    selected: HashMap<Path, Range<usize>>,
    caret_block: Option<Path>,
    caret: Option<usize>,
}

fn unknown_node(theme: &Theme, path: &[usize]) -> AnyElement {
    div()
        .text_color(theme.muted_foreground)
        .italic()
        .child(format!("<unsupported node at {path:?}>"))
        .into_any_element()
}

impl EditorView for DocumentView {
    fn state(&self) -> &Editor {
        &self.editor
    }

    fn dispatch(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let scroll = tx.meta.scroll_into_view;
        self.editor.apply(tx)?;
        self.changed = true;
        self.scroll_requested |= scroll;
        Ok(())
    }

    fn coords_at(&self, point: &DocPoint) -> Option<Coords> {
        let pos = self.editor.resolve(point)?;
        let line = self.layouts.get(&pos.block_path)?;
        let layout = &line.text_layout;
        let origin = layout
            .position_for_index(pos.offset.min(line.len))
            .or_else(|| layout.position_for_index(layout.len()))?;
        let x = f32::from(origin.x);
        let top = f32::from(origin.y);
        Some(Coords {
            left: x,
            right: x,
            top,
            bottom: top + f32::from(layout.line_height()),
        })
    }
}

impl EntityInputHandler for DocumentView {
    fn text_for_range(
        &mut self,
        range_utf16: Range<usize>,
        adjusted_range: &mut Option<Range<usize>>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<String> {
        let pos = self.editor.resolved_focus()?;
        let text = pos.text.as_str();
        let range = utf16_to_byte(text, range_utf16.start)..utf16_to_byte(text, range_utf16.end);
        adjusted_range.replace(byte_to_utf16_range(text, range.clone()));
        Some(text.get(range).unwrap_or("").to_string())
    }

    fn selected_text_range(
        &mut self,
        _ignore_disabled_input: bool,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<UTF16Selection> {
        let (_, text, range) = self.focus_block_range()?;
        let sel = self.editor.selection();
        let reversed = !sel.is_collapsed() && ordered_selection_points(sel).0 == sel.focus;
        Some(UTF16Selection {
            range: byte_to_utf16_range(&text, range),
            reversed,
        })
    }

    fn replace_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let inserted = new_text.replace("\r\n", "\n").replace('\r', "\n");
        let marked = self.ime_marked_range.take();
        cx.emit(DocumentEvent::TextInput);

        if range_utf16.is_none() && marked.is_none() {
            self.changed = true;
            self.replace_selection(&inserted, cx);
            return;
        }
        let Some((block_path, text, _)) = self.focus_block_range() else {
            return;
        };
        let range = range_utf16
            .map(|r| utf16_to_byte(&text, r.start)..utf16_to_byte(&text, r.end))
            .or(marked)
            .unwrap_or_default();
        self.replace_in_block(&block_path, range, &inserted, cx);
    }

    fn marked_text_range(
        &self,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Range<usize>> {
        let pos = self.editor.resolved_focus()?;
        self.ime_marked_range
            .as_ref()
            .map(|r| byte_to_utf16_range(&pos.text, r.clone()))
    }

    fn unmark_text(&mut self, _window: &mut Window, _cx: &mut Context<Self>) {
        self.ime_marked_range = None;
    }

    fn replace_and_mark_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        new_selected_range_utf16: Option<Range<usize>>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let Some((block_path, text, selected)) = self.focus_block_range() else {
            return;
        };
        let range = range_utf16
            .map(|r| utf16_to_byte(&text, r.start)..utf16_to_byte(&text, r.end))
            .or_else(|| self.ime_marked_range.clone())
            .unwrap_or(selected);
        let inserted = new_text.replace("\r\n", "\n").replace('\r', "\n");

        cx.emit(DocumentEvent::TextInput);
        self.replace_in_block(&block_path, range.clone(), &inserted, cx);

        if inserted.is_empty() {
            self.ime_marked_range = None;
            return;
        }
        let marked = range.start..range.start + inserted.len();
        self.ime_marked_range = Some(marked.clone());

        if let Some(sel) = new_selected_range_utf16 {
            let anchor = marked.start + utf16_to_byte(&inserted, sel.start);
            let focus = marked.start + utf16_to_byte(&inserted, sel.end);
            if let (Some(anchor), Some(focus)) = (
                self.point_in_block(&block_path, anchor),
                self.point_in_block(&block_path, focus),
            ) {
                self.editor.set_selection(Selection { anchor, focus });
            }
        }
        cx.notify();
    }

    fn bounds_for_range(
        &mut self,
        range_utf16: Range<usize>,
        _bounds: Bounds<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Bounds<Pixels>> {
        let pos = self.editor.resolved_focus()?;
        let line = self.layouts.get(&pos.block_path)?;
        let start = utf16_to_byte(&pos.text, range_utf16.start).min(line.len);
        let origin = line.text_layout.position_for_index(start)?;
        Some(Bounds::from_corners(
            origin,
            point(origin.x + px(1.), origin.y + line.text_layout.line_height()),
        ))
    }

    fn character_index_for_point(
        &mut self,
        point: gpui::Point<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<usize> {
        let pos = self.editor.resolved_focus()?;
        let line = self.layouts.get(&pos.block_path)?;
        let ix = match line.text_layout.index_for_position(point) {
            Ok(ix) | Err(ix) => ix.min(line.len),
        };
        Some(byte_to_utf16(&pos.text, ix))
    }
}

impl Focusable for DocumentView {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

/// One text block painted as a single styled line.
struct BlockLine {
    state: Entity<DocumentView>,
    path: Path,
    text: SharedString,
    /// Byte length and marks of each non-empty text leaf.
    leaves: Vec<(usize, Marks)>,
    selected: Option<Range<usize>>,
    caret: Option<usize>,
    marked: Option<Range<usize>>,
    mono_font: SharedString,
    code_bg: Hsla,
    selection_color: Hsla,
    styled_text: StyledText,
}

impl BlockLine {
    fn runs(&self, base: &TextStyle) -> Vec<TextRun> {
        let mut runs = Vec::new();
        let mut cursor = 0usize;
        for (len, marks) in &self.leaves {
            let mut style = base.clone();
            if marks.bold {
                style.font_weight = FontWeight::BOLD;
            }
            if marks.italic {
                style.font_style = FontStyle::Italic;
            }
            if marks.code {
                style.font_family = self.mono_font.clone();
                style.background_color = Some(self.code_bg);
            }

            let seg = cursor..cursor + len;
            cursor = seg.end;

            let Some(marked) = self
                .marked
                .as_ref()
                .filter(|m| m.start < seg.end && seg.start < m.end)
            else {
                runs.push(style.to_run(*len));
                continue;
            };

            let mid = marked.start.max(seg.start)..marked.end.min(seg.end);
            if mid.start > seg.start {
                runs.push(style.clone().to_run(mid.start - seg.start));
            }
            let mut underlined = style.clone();
            underlined.underline = Some(UnderlineStyle {
                thickness: px(1.),
                color: Some(base.color),
                wavy: false,
            });
            runs.push(underlined.to_run(mid.len()));
            if seg.end > mid.end {
                runs.push(style.to_run(seg.end - mid.end));
            }
        }
        runs
    }

    fn paint_selection(
        start: gpui::Point<Pixels>,
        end: gpui::Point<Pixels>,
        bounds: &Bounds<Pixels>,
        line_height: Pixels,
        color: Hsla,
        window: &mut Window,
    ) {
        let mut rects = Vec::new();
        if start.y == end.y {
            rects.push(Bounds::from_corners(start, point(end.x, end.y + line_height)));
        } else {
            rects.push(Bounds::from_corners(
                start,
                point(bounds.right(), start.y + line_height),
            ));
            if end.y > start.y + line_height {
                rects.push(Bounds::from_corners(
                    point(bounds.left(), start.y + line_height),
                    point(bounds.right(), end.y),
                ));
            }
            rects.push(Bounds::from_corners(
                point(bounds.left(), end.y),
                point(end.x, end.y + line_height),
            ));
        }
        for rect in rects {
            window.paint_quad(gpui::quad(
                rect,
                px(0.),
                color,
                gpui::Edges::default(),
                gpui::transparent_black(),
                gpui::BorderStyle::default(),
            ));
        }
    }
}

impl IntoElement for BlockLine {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

impl Element for BlockLine {
    type RequestLayoutState = ();
    type PrepaintState = Hitbox;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static std::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        global_element_id: Option<&GlobalElementId>,
        inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let base = window.text_style();
        // Empty blocks still need a line box for the caret and hit testing.
        let (render_text, runs): (SharedString, _) = if self.text.is_empty() {
            (" ".into(), vec![base.to_run(1)])
        } else {
            (self.text.clone(), self.runs(&base))
        };

        self.styled_text = StyledText::new(render_text).with_runs(runs);
        let (layout_id, _) =
            self.styled_text
                .request_layout(global_element_id, inspector_id, window, cx);
        (layout_id, ())
    }

    fn prepaint(
        &mut self,
        id: Option<&GlobalElementId>,
        inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _: &mut Self::RequestLayoutState,
        window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        self.styled_text
            .prepaint(id, inspector_id, bounds, &mut (), window, cx);

        let line = LineLayout {
            bounds,
            text_layout: self.styled_text.layout().clone(),
            len: self.text.len(),
        };
        let path = self.path.clone();
        self.state.update(cx, |state, _| {
            state.layouts.insert(path, line);
        });

        window.insert_hitbox(bounds, HitboxBehavior::Normal)
    }

    fn paint(
        &mut self,
        global_id: Option<&GlobalElementId>,
        _: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _: &mut Self::RequestLayoutState,
        hitbox: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        window.set_cursor_style(CursorStyle::IBeam, hitbox);
        self.styled_text
            .paint(global_id, None, bounds, &mut (), &mut (), window, cx);

        let layout = self.styled_text.layout().clone();
        let line_height = layout.line_height();

        if let Some(range) = &self.selected
            && let (Some(start), Some(end)) = (
                layout.position_for_index(range.start),
                layout
                    .position_for_index(range.end)
                    .or_else(|| layout.position_for_index(layout.len())),
            )
        {
            Self::paint_selection(start, end, &bounds, line_height, self.selection_color, window);
        }

        let focused = self.state.read(cx).focus_handle.is_focused(window);
        if let Some(offset) = self.caret.filter(|_| focused)
            && let Some(pos) = layout
                .position_for_index(offset.min(self.text.len()))
                .or_else(|| layout.position_for_index(layout.len()))
        {
            window.paint_quad(gpui::quad(
                Bounds::from_corners(pos, point(pos.x + px(1.5), pos.y + line_height)),
                px(0.),
                window.text_style().color,
                gpui::Edges::default(),
                gpui::transparent_black(),
                gpui::BorderStyle::default(),
            ));
        }
    }
}

/// Transparent overlay that owns keyboard input and pointer selection for
/// the whole document.
struct DocumentInputElement {
    state: Entity<DocumentView>,
}

impl IntoElement for DocumentInputElement {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

impl Element for DocumentInputElement {
    type RequestLayoutState = ();
    type PrepaintState = Hitbox;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static std::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let mut style = gpui::Style::default();
        style.size.width = gpui::relative(1.).into();
        style.size.height = gpui::relative(1.).into();
        (window.request_layout(style, [], cx), ())
    }

    fn prepaint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _state: &mut Self::RequestLayoutState,
        window: &mut Window,
        _cx: &mut App,
    ) -> Self::PrepaintState {
        // Scroll wheel events still reach the scroll area underneath.
        window.insert_hitbox(bounds, HitboxBehavior::BlockMouseExceptScroll)
    }

    fn paint(
        &mut self,
        _global_id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request: &mut Self::RequestLayoutState,
        hitbox: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        window.handle_input(
            &focus_handle,
            ElementInputHandler::new(bounds, self.state.clone()),
            cx,
        );
        window.set_cursor_style(CursorStyle::IBeam, hitbox);

        window.on_mouse_event({
            let state = self.state.clone();
            let hitbox = hitbox.clone();
            move |event: &MouseDownEvent, phase, window, cx| {
                if !phase.bubble() || event.button != MouseButton::Left {
                    return;
                }
                if !hitbox.is_hovered(window) {
                    return;
                }
                let focus_handle = state.read(cx).focus_handle.clone();
                window.focus(&focus_handle);
                state.update(cx, |this, cx| {
                    this.mouse_down(event.position, event.modifiers.shift, cx);
                });
            }
        });

        window.on_mouse_event({
            let state = self.state.clone();
            let hitbox = hitbox.clone();
            move |event: &MouseMoveEvent, phase, window, cx| {
                if !phase.bubble() {
                    return;
                }
                let hovered = hitbox.is_hovered(window);
                state.update(cx, |this, cx| {
                    this.hover_at(hovered.then_some(event.position), cx);
                    if this.selecting && event.pressed_button == Some(MouseButton::Left) {
                        this.drag_to(event.position, cx);
                    }
                });
            }
        });

        window.on_mouse_event({
            let state = self.state.clone();
            move |event: &MouseUpEvent, _phase, _window, cx| {
                if event.button != MouseButton::Left {
                    return;
                }
                state.update(cx, |this, _| this.selecting = false);
            }
        });
    }
}

impl Render for DocumentView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme().clone();
        let state = cx.entity().clone();

        if !self.did_auto_focus {
            window.focus(&self.focus_handle);
            self.did_auto_focus = true;
        }
        // New blocks have no geometry until this frame is laid out.
        if std::mem::take(&mut self.scroll_requested) {
            cx.on_next_frame(window, |this, _, cx| this.scroll_cursor_into_view(cx));
        }
        self.layouts.clear();

        let caret = self
            .editor
            .selection()
            .is_collapsed()
            .then(|| self.editor.resolved_focus())
            .flatten();
        let rcx = RenderCx {
            state: state.clone(),
            selected: self.selection_ranges(),
            caret_block: caret.as_ref().map(|pos| pos.block_path.clone()),
            caret: caret.map(|pos| pos.offset),
            theme,
        };

        let blocks: Vec<AnyElement> = self
            .editor
            .doc()
            .children
            .iter()
            .enumerate()
            .map(|(ix, node)| {
                div()
                    .relative()
                    .pl(px(HANDLE_GUTTER))
                    .when(self.hovered_block == Some(ix), |this| {
                        this.child(BlockHandle::new(ix))
                    })
                    .child(self.render_node(node, vec![ix], &rcx))
                    .into_any_element()
            })
            .collect();

        div()
            .id(("scriptum-document", cx.entity_id()))
            .key_context(CONTEXT)
            .track_focus(&self.focus_handle)
            .tab_index(0)
            .size_full()
            .relative()
            .text_color(rcx.theme.foreground)
            .on_action(window.listener_for(&state, Self::backspace))
            .on_action(window.listener_for(&state, Self::delete))
            .on_action(window.listener_for(&state, Self::enter))
            .on_action(window.listener_for(&state, Self::left))
            .on_action(window.listener_for(&state, Self::right))
            .on_action(window.listener_for(&state, Self::up))
            .on_action(window.listener_for(&state, Self::down))
            .on_action(window.listener_for(&state, Self::select_left))
            .on_action(window.listener_for(&state, Self::select_right))
            .on_action(window.listener_for(&state, Self::select_all))
            .on_action(window.listener_for(&state, Self::undo))
            .on_action(window.listener_for(&state, Self::redo))
            .on_action(window.listener_for(&state, Self::escape))
            .on_action(window.listener_for(&state, Self::toggle_bold))
            .on_action(window.listener_for(&state, Self::toggle_italic))
            .on_action(window.listener_for(&state, Self::toggle_code))
            .child(
                div()
                    .id("scriptum-scroll")
                    .size_full()
                    .overflow_y_scroll()
                    .track_scroll(&self.scroll_handle)
                    .child(
                        div()
                            .flex()
                            .flex_col()
                            .gap(px(6.))
                            .px(px(16.))
                            .py(px(24.))
                            .children(blocks),
                    ),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .right_0()
                    .bottom_0()
                    .child(DocumentInputElement { state }),
            )
    }
}

fn prev_boundary(text: &str, offset: usize) -> usize {
    if offset == 0 {
        return 0;
    }
    let mut ix = (offset - 1).min(text.len());
    while ix > 0 && !text.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn next_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    let mut ix = offset + 1;
    while ix < text.len() && !text.is_char_boundary(ix) {
        ix += 1;
    }
    ix
}

fn utf16_to_byte(s: &str, utf16_ix: usize) -> usize {
    let mut utf16_count = 0usize;
    for (byte_ix, ch) in s.char_indices() {
        if utf16_count >= utf16_ix {
            return byte_ix;
        }
        utf16_count += ch.len_utf16();
    }
    s.len()
}

fn byte_to_utf16(s: &str, byte_ix: usize) -> usize {
    s.char_indices()
        .take_while(|(ix, _)| *ix < byte_ix)
        .map(|(_, ch)| ch.len_utf16())
        .sum()
}

fn byte_to_utf16_range(s: &str, range: Range<usize>) -> Range<usize> {
    byte_to_utf16(s, range.start)..byte_to_utf16(s, range.end)
}
