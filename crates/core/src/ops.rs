use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{AttrPatch, Document, Node, Selection, TextNode, clamp_to_char_boundary};
use crate::editor::ApplyError;

pub type Path = Vec<usize>;

/// A primitive document change. Text offsets are byte offsets into a single
/// text leaf; node paths index children from the document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        #[serde(default)]
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        #[serde(default)]
        path: Path,
        range: Range<usize>,
    },
    InsertNode {
        #[serde(default)]
        path: Path,
        node: Node,
    },
    RemoveNode {
        #[serde(default)]
        path: Path,
    },
    SetNodeAttrs {
        #[serde(default)]
        path: Path,
        patch: AttrPatch,
    },
}

impl Op {
    pub fn path(&self) -> &[usize] {
        match self {
            Op::InsertText { path, .. }
            | Op::RemoveText { path, .. }
            | Op::InsertNode { path, .. }
            | Op::RemoveNode { path }
            | Op::SetNodeAttrs { path, .. } => path,
        }
    }

    /// Applies the op to `doc` and returns the op that reverts it.
    pub(crate) fn apply(self, doc: &mut Document) -> Result<Op, ApplyError> {
        match self {
            Op::InsertText { path, offset, text } => {
                let leaf = text_leaf(doc, &path)?;
                let at = clamp_to_char_boundary(&leaf.text, offset);
                leaf.text.insert_str(at, &text);
                Ok(Op::RemoveText {
                    range: at..at + text.len(),
                    path,
                })
            }
            Op::RemoveText { path, range } => {
                let leaf = text_leaf(doc, &path)?;
                let start = clamp_to_char_boundary(&leaf.text, range.start);
                let end = clamp_to_char_boundary(&leaf.text, range.end).max(start);
                let text: String = leaf.text.drain(start..end).collect();
                Ok(Op::InsertText {
                    path,
                    offset: start,
                    text,
                })
            }
            Op::InsertNode { path, node } => {
                doc.insert_child(&path, node)?;
                Ok(Op::RemoveNode { path })
            }
            Op::RemoveNode { path } => {
                let node = doc.remove_child(&path)?;
                Ok(Op::InsertNode { path, node })
            }
            Op::SetNodeAttrs { path, patch } => {
                let attrs = match doc.node_mut(&path)? {
                    Node::Element(el) => &mut el.attrs,
                    Node::Void(void) => &mut void.attrs,
                    Node::Text(_) => return Err(ApplyError::TextHasNoAttrs(path)),
                };
                let patch = patch.apply_to(attrs);
                Ok(Op::SetNodeAttrs { path, patch })
            }
        }
    }
}

fn text_leaf<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextNode, ApplyError> {
    match doc.node_mut(path)? {
        Node::Text(leaf) => Ok(leaf),
        _ => Err(ApplyError::NotText(path.to_vec())),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The view should bring the selection into its viewport after applying.
    #[serde(default)]
    pub scroll_into_view: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub ops: Vec<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_after: Option<Selection>,
    #[serde(default)]
    pub meta: TransactionMeta,
}

impl Transaction {
    pub fn new(ops: Vec<Op>) -> Self {
        Self {
            ops,
            selection_after: None,
            meta: TransactionMeta::default(),
        }
    }

    pub fn selection_after(mut self, selection_after: Selection) -> Self {
        self.selection_after = Some(selection_after);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }

    pub fn scroll_into_view(mut self) -> Self {
        self.meta.scroll_into_view = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.selection_after.is_none()
    }
}
