use serde::{Deserialize, Serialize};

use crate::core::{Marks, Node, Point, Selection, clamp_to_char_boundary};
use crate::edit::EditError;
use crate::editor::Editor;
use crate::ops::{Op, Path, Transaction};
use crate::query::{
    TextBlock, is_point_in_block, ordered_selection_points, point_for_global_offset,
    point_global_offset, text_blocks_in_order, text_leaves, text_len,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    Bold,
    Italic,
    Code,
}

impl MarkKind {
    pub fn name(self) -> &'static str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Code => "code",
        }
    }

    pub fn is_set(self, marks: &Marks) -> bool {
        match self {
            MarkKind::Bold => marks.bold,
            MarkKind::Italic => marks.italic,
            MarkKind::Code => marks.code,
        }
    }

    pub fn set(self, mut marks: Marks, on: bool) -> Marks {
        match self {
            MarkKind::Bold => marks.bold = on,
            MarkKind::Italic => marks.italic = on,
            MarkKind::Code => marks.code = on,
        }
        marks
    }
}

/// A selected slice of one text block, as block-global offsets.
struct BlockRange<'a> {
    block: &'a TextBlock<'a>,
    start: usize,
    end: usize,
}

fn selected_block_ranges<'a>(
    blocks: &'a [TextBlock<'a>],
    sel: &Selection,
) -> Result<Vec<BlockRange<'a>>, EditError> {
    let (start, end) = ordered_selection_points(sel);
    let index_of = |point: &Point| {
        blocks
            .iter()
            .position(|b| b.path == point.block_path())
            .ok_or(EditError::NotInTextBlock)
    };
    let (a, b) = (index_of(&start)?, index_of(&end)?);
    let (first, last) = (a.min(b), a.max(b));

    let global = |block: &TextBlock, point: &Point| {
        let leaf = point.path.last().copied().unwrap_or(0);
        point_global_offset(&block.el.children, leaf, point.offset)
    };

    Ok(blocks[first..=last]
        .iter()
        .zip(first..)
        .filter_map(|(block, ix)| {
            let from = if ix == first { global(block, &start) } else { 0 };
            let to = if ix == last {
                global(block, &end)
            } else {
                text_len(&block.el.children)
            };
            (from < to).then_some(BlockRange {
                block,
                start: from,
                end: to,
            })
        })
        .collect())
}

/// Whether every selected character carries `mark`. An empty range is never
/// fully marked.
pub fn range_fully_marked(editor: &Editor, sel: &Selection, mark: MarkKind) -> Result<bool, EditError> {
    let blocks = text_blocks_in_order(editor.doc(), editor.schema());
    let ranges = selected_block_ranges(&blocks, sel)?;
    if ranges.is_empty() {
        return Ok(false);
    }

    Ok(ranges.iter().all(|range| {
        let children = &range.block.el.children;
        text_leaves(children)
            .filter(|&(_, at, text)| at < range.end && at + text.len() > range.start)
            .all(|(ix, ..)| matches!(&children[ix], Node::Text(t) if mark.is_set(&t.marks)))
    }))
}

/// Rewrites the leaves of a text block so `[start_global, end_global)` has
/// its marks passed through `apply`. Leaves straddling a bound are split.
pub fn apply_marks_in_block(
    children: &[Node],
    start_global: usize,
    end_global: usize,
    apply: &dyn Fn(Marks) -> Marks,
) -> Vec<Node> {
    if start_global >= end_global {
        return children.to_vec();
    }

    let mut out = Vec::with_capacity(children.len() + 2);
    let mut at = 0usize;
    for node in children {
        let Node::Text(leaf) = node else {
            out.push(node.clone());
            continue;
        };
        let leaf_start = at;
        at += leaf.text.len();

        let from = clamp_to_char_boundary(&leaf.text, start_global.saturating_sub(leaf_start));
        let to = clamp_to_char_boundary(&leaf.text, end_global.saturating_sub(leaf_start));
        if from >= to {
            out.push(node.clone());
            continue;
        }

        let (head, rest) = leaf.text.split_at(from);
        let (middle, tail) = rest.split_at(to - from);
        for (text, marks) in [(head, leaf.marks), (middle, apply(leaf.marks)), (tail, leaf.marks)] {
            if !text.is_empty() {
                out.push(Node::marked_text(text, marks));
            }
        }
    }

    if out.is_empty() {
        out.push(Node::text(""));
    }
    out
}

fn child_path(parent: &[usize], ix: usize) -> Path {
    let mut path = parent.to_vec();
    path.push(ix);
    path
}

/// Sets or clears `mark` over the whole selection. The selection is kept.
pub fn set_mark_range(
    editor: &Editor,
    sel: &Selection,
    mark: MarkKind,
    on: bool,
) -> Result<Transaction, EditError> {
    let blocks = text_blocks_in_order(editor.doc(), editor.schema());
    let ranges = selected_block_ranges(&blocks, sel)?;
    let apply = move |marks: Marks| mark.set(marks, on);

    let mut ops = Vec::new();
    let mut anchor = sel.anchor.clone();
    let mut focus = sel.focus.clone();

    for range in &ranges {
        let block_path = range.block.path.as_slice();
        let children = range.block.el.children.as_slice();
        let rewritten = apply_marks_in_block(children, range.start, range.end, &apply);

        // Swap the whole leaf list; normalization merges equal neighbours.
        ops.extend(
            (0..children.len())
                .rev()
                .map(|ix| Op::RemoveNode { path: child_path(block_path, ix) }),
        );
        ops.extend(rewritten.iter().cloned().enumerate().map(|(ix, node)| Op::InsertNode {
            path: child_path(block_path, ix),
            node,
        }));

        for point in [&mut anchor, &mut focus] {
            if is_point_in_block(point, block_path) {
                let leaf = point.path.last().copied().unwrap_or(0);
                let global = point_global_offset(children, leaf, point.offset);
                *point = point_for_global_offset(block_path, &rewritten, global);
            }
        }
    }

    let source = format!("mark:{}:{}", mark.name(), if on { "add" } else { "remove" });
    Ok(Transaction::new(ops)
        .selection_after(Selection { anchor, focus })
        .source(source))
}
