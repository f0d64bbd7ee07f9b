use crate::core::{Document, Node, PathError, Point, Selection};
use crate::history::{History, Step};
use crate::ops::{Op, Path, Transaction};
use crate::schema::Schema;

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    Path(#[from] PathError),
    #[error("no text leaf at {0:?}")]
    NotText(Path),
    #[error("text leaf at {0:?} has no attrs")]
    TextHasNoAttrs(Path),
    #[error("normalization did not settle after {0} passes")]
    Unsettled(usize),
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Undo steps kept; the oldest are dropped first.
    pub history_limit: usize,
    pub normalize_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 200,
            normalize_limit: 100,
        }
    }
}

/// Document state plus its transaction history.
///
/// Every mutation goes through [`Editor::apply`]: ops are applied in order,
/// the schema's normalize passes run until nothing changes, and the ops that
/// revert all of it become one undo step. A failing op leaves the document
/// as it was.
pub struct Editor {
    doc: Document,
    selection: Selection,
    schema: Schema,
    config: EditorConfig,
    history: History,
}

impl Editor {
    pub fn new(doc: Document, selection: Selection) -> Self {
        Self::with_schema(doc, selection, Schema::basic())
    }

    pub fn with_schema(doc: Document, selection: Selection, schema: Schema) -> Self {
        let mut editor = Self {
            doc,
            selection,
            schema,
            config: EditorConfig::default(),
            history: History::default(),
        };
        editor.settle();
        editor
    }

    /// A single paragraph holding `text`, cursor at its start.
    pub fn with_text(text: &str) -> Self {
        let doc = Document::new(vec![Node::paragraph(text)]);
        Self::new(doc, Selection::collapsed(Point::new(vec![0, 0], 0)))
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = self.schema.normalize_selection(&self.doc, &selection);
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let Some(step) = self.history.take_undo() else {
            return false;
        };
        let land = step.before.clone();
        let step = self.replay(step, land);
        self.history.push_undone(step);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(step) = self.history.take_redo() else {
            return false;
        };
        let land = step.after.clone();
        let step = self.replay(step, land);
        self.history.push_redone(step);
        true
    }

    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let snapshot = self.doc.clone();
        let before = self.selection.clone();
        let source = tx.meta.source.clone();

        let revert = match self.apply_ops(tx) {
            Ok(revert) => revert,
            Err(err) => {
                self.doc = snapshot;
                self.selection = before;
                return Err(err);
            }
        };
        self.set_selection(self.selection.clone());

        tracing::trace!(
            source = source.as_deref().unwrap_or("unknown"),
            ops = revert.len(),
            "applied transaction"
        );

        if !revert.is_empty() {
            let step = Step {
                revert,
                before,
                after: self.selection.clone(),
            };
            self.history.record(step, self.config.history_limit);
        }
        Ok(())
    }

    /// Applies the transaction's ops, its selection and the normalize passes,
    /// returning the ops that revert them in order.
    fn apply_ops(&mut self, tx: Transaction) -> Result<Vec<Op>, ApplyError> {
        let mut revert = tx
            .ops
            .into_iter()
            .map(|op| self.apply_op(op))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(selection) = tx.selection_after {
            self.selection = selection;
        }
        revert.extend(self.normalize()?);
        revert.reverse();
        Ok(revert)
    }

    /// Replays a history step, lands on `selection` and returns the step
    /// that travels back.
    fn replay(&mut self, step: Step, selection: Selection) -> Step {
        let mut revert = Vec::with_capacity(step.revert.len());
        for op in step.revert {
            match self.apply_op(op) {
                Ok(op) => revert.push(op),
                Err(err) => {
                    tracing::warn!("history replay stopped: {err}");
                    break;
                }
            }
        }
        revert.reverse();
        self.selection = selection;
        self.settle();
        Step {
            revert,
            before: step.before,
            after: step.after,
        }
    }

    fn settle(&mut self) {
        if let Err(err) = self.normalize() {
            tracing::warn!("document normalization failed: {err}");
        }
        self.set_selection(self.selection.clone());
    }

    fn normalize(&mut self) -> Result<Vec<Op>, ApplyError> {
        let mut revert = Vec::new();
        for _ in 0..self.config.normalize_limit {
            let ops = self.schema.normalize(&self.doc);
            if ops.is_empty() {
                return Ok(revert);
            }
            for op in ops {
                revert.push(self.apply_op(op)?);
            }
        }
        Err(ApplyError::Unsettled(self.config.normalize_limit))
    }

    fn apply_op(&mut self, op: Op) -> Result<Op, ApplyError> {
        let revert = op.apply(&mut self.doc)?;
        self.selection.map_through(&revert, &self.doc);
        Ok(revert)
    }
}
