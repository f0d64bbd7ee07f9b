use scriptum_core::{ApplyError, Editor, Point, Transaction};

/// Screen rectangle of a document position, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coords {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Handle to a live document view.
///
/// `dispatch` is the only way the command layer mutates the document.
pub trait EditorView {
    fn state(&self) -> &Editor;
    fn dispatch(&mut self, tx: Transaction) -> Result<(), ApplyError>;
    fn coords_at(&self, point: &Point) -> Option<Coords>;
}

/// Fixed-metric view without a window: one line per text block, every
/// character the same width.
pub struct HeadlessView {
    editor: Editor,
    pub char_width: f32,
    pub line_height: f32,
    scroll_requests: usize,
}

impl HeadlessView {
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            char_width: 8.0,
            line_height: 20.0,
            scroll_requests: 0,
        }
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Number of applied transactions that asked to be scrolled into view.
    pub fn scroll_requests(&self) -> usize {
        self.scroll_requests
    }
}

impl EditorView for HeadlessView {
    fn state(&self) -> &Editor {
        &self.editor
    }

    fn dispatch(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let scroll = tx.meta.scroll_into_view;
        self.editor.apply(tx)?;
        if scroll {
            self.scroll_requests += 1;
        }
        Ok(())
    }

    fn coords_at(&self, point: &Point) -> Option<Coords> {
        let pos = self.editor.resolve(point)?;
        let line = self
            .editor
            .text_blocks()
            .iter()
            .position(|b| b.path == pos.block_path)?;
        let left = pos.text_before().chars().count() as f32 * self.char_width;
        let top = line as f32 * self.line_height;
        Some(Coords {
            left,
            right: left,
            top,
            bottom: top + self.line_height,
        })
    }
}
