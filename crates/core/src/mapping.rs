use std::cmp::Ordering;
use std::ops::Range;

use crate::core::{Document, Node, Point, Selection};
use crate::ops::Op;
use crate::query::node_at_path;

/// Where points inside a removed text leaf land: its left text sibling.
#[derive(Debug, Clone, Copy)]
struct LeftLeaf {
    index: usize,
    shift: usize,
    len: usize,
}

impl Selection {
    /// Keeps both points on the same content after an op was applied to
    /// `doc`. `revert` is the op that undoes it, which carries the offsets
    /// the op actually touched.
    pub(crate) fn map_through(&mut self, revert: &Op, doc: &Document) {
        let left = match revert {
            Op::InsertNode { path, node } => left_leaf(doc, path, node),
            _ => None,
        };
        for point in [&mut self.anchor, &mut self.focus] {
            match revert {
                Op::RemoveText { path, range } => point.after_text_insert(path, range.start, range.len()),
                Op::InsertText { path, offset, text } => {
                    point.after_text_remove(path, *offset..*offset + text.len())
                }
                Op::RemoveNode { path } => point.after_node_insert(path),
                Op::InsertNode { path, .. } => point.after_node_remove(path, left),
                Op::SetNodeAttrs { .. } => {}
            }
        }
    }
}

/// When the left sibling already ends with the removed text the leaves were
/// merged, so offsets keep their place inside the merged text.
fn left_leaf(doc: &Document, path: &[usize], removed: &Node) -> Option<LeftLeaf> {
    let Node::Text(removed) = removed else {
        return None;
    };
    let (&index, parent) = path.split_last()?;
    let index = index.checked_sub(1)?;
    let mut left_path = parent.to_vec();
    left_path.push(index);
    let Some(Node::Text(left)) = node_at_path(doc, &left_path) else {
        return None;
    };
    let len = left.text.len();
    let shift = if left.text.ends_with(&removed.text) {
        len - removed.text.len()
    } else {
        len
    };
    Some(LeftLeaf { index, shift, len })
}

impl Point {
    fn after_text_insert(&mut self, path: &[usize], at: usize, len: usize) {
        if self.path == path && self.offset >= at {
            self.offset += len;
        }
    }

    fn after_text_remove(&mut self, path: &[usize], range: Range<usize>) {
        if self.path != path || self.offset <= range.start {
            return;
        }
        self.offset = if self.offset >= range.end {
            self.offset - range.len()
        } else {
            range.start
        };
    }

    /// Index of this point's ancestor among the children of `parent`.
    fn index_under(&self, parent: &[usize]) -> Option<usize> {
        (self.path.len() > parent.len() && self.path.starts_with(parent))
            .then(|| self.path[parent.len()])
    }

    fn after_node_insert(&mut self, path: &[usize]) {
        let Some((&index, parent)) = path.split_last() else {
            return;
        };
        match self.index_under(parent) {
            Some(ix) if ix >= index => self.path[parent.len()] += 1,
            _ => {}
        }
    }

    fn after_node_remove(&mut self, path: &[usize], left: Option<LeftLeaf>) {
        let Some((&index, parent)) = path.split_last() else {
            return;
        };
        let depth = parent.len();
        let Some(ix) = self.index_under(parent) else {
            return;
        };
        match ix.cmp(&index) {
            Ordering::Less => {}
            Ordering::Greater => self.path[depth] = ix - 1,
            Ordering::Equal => {
                self.path.truncate(depth + 1);
                match left {
                    Some(leaf) => {
                        self.path[depth] = leaf.index;
                        self.offset = (leaf.shift + self.offset).min(leaf.len);
                    }
                    None => {
                        self.path[depth] = index.saturating_sub(1);
                        self.offset = 0;
                    }
                }
            }
        }
    }
}
