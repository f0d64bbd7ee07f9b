use crate::core::{ElementNode, Marks, Node, Point, Selection, clamp_to_char_boundary};
use crate::editor::Editor;
use crate::ops::{Op, Path, Transaction};
use crate::query::{
    ResolvedPos, ancestor_of_kind, children_at_path, element_at_path, insertion_point,
    node_at_path, ordered_selection_points, point_for_global_offset, resolve, text_len,
};
use crate::schema::first_text_point_in;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("selection is not inside a text block")]
    NotInTextBlock,
    #[error("no element at path {0:?}")]
    MissingElement(Path),
    #[error("node at {0:?} has no text position")]
    NoTextPosition(Path),
}

/// Splits inline children at a block-global offset. Leaves ending exactly at
/// the offset go left; leaves starting there go right.
pub fn split_inline_children(children: &[Node], offset: usize) -> (Vec<Node>, Vec<Node>) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut cursor = 0usize;

    for node in children {
        let Node::Text(t) = node else {
            if cursor < offset {
                head.push(node.clone());
            } else {
                tail.push(node.clone());
            }
            continue;
        };
        let start = cursor;
        let end = cursor + t.text.len();
        cursor = end;

        if end <= offset {
            head.push(node.clone());
        } else if start >= offset {
            tail.push(node.clone());
        } else {
            let at = clamp_to_char_boundary(&t.text, offset - start);
            head.push(Node::marked_text(&t.text[..at], t.marks));
            tail.push(Node::marked_text(&t.text[at..], t.marks));
        }
    }
    (head, tail)
}

fn leaf_marks(node: Option<&Node>) -> Option<Marks> {
    match node {
        Some(Node::Text(t)) => Some(t.marks),
        _ => None,
    }
}

/// Marks text typed between `head` and `tail` should carry.
fn marks_between(head: &[Node], tail: &[Node]) -> Marks {
    leaf_marks(head.last())
        .or_else(|| leaf_marks(tail.first()))
        .unwrap_or_default()
}

fn block_with(template: &ElementNode, children: Vec<Node>) -> Node {
    let children = if children.is_empty() {
        vec![Node::text("")]
    } else {
        children
    };
    Node::Element(ElementNode {
        kind: template.kind.clone(),
        attrs: template.attrs.clone(),
        children,
    })
}

fn sibling_path(path: &[usize], delta: usize) -> Path {
    let mut out = path.to_vec();
    if let Some(last) = out.last_mut() {
        *last += delta;
    }
    out
}

fn child_path(path: &[usize], ix: usize) -> Path {
    let mut out = path.to_vec();
    out.push(ix);
    out
}

/// The enclosing text block of the selection with the selected content cut
/// out. Applying `ops` removes blocks the selection swallowed; the text
/// block itself is still in place and gets replaced by [`Cut::replace`].
struct Cut {
    block_path: Path,
    template: ElementNode,
    head: Vec<Node>,
    tail: Vec<Node>,
    ops: Vec<Op>,
}

impl Cut {
    fn replace(mut self, replacement: Vec<Node>) -> Vec<Op> {
        self.ops.push(Op::RemoveNode {
            path: self.block_path.clone(),
        });
        for (ix, node) in replacement.into_iter().enumerate() {
            self.ops.push(Op::InsertNode {
                path: sibling_path(&self.block_path, ix),
                node,
            });
        }
        self.ops
    }

    fn head_len(&self) -> usize {
        text_len(&self.head)
    }
}

/// Selections crossing container boundaries collapse to their start, so
/// nothing outside the first block's container is deleted.
fn cut_selection(editor: &Editor) -> Result<Cut, EditError> {
    let doc = editor.doc();
    let (start, end) = ordered_selection_points(editor.selection());
    let from = resolve(doc, &start).ok_or(EditError::NotInTextBlock)?;
    let to = resolve(doc, &end).ok_or(EditError::NotInTextBlock)?;

    let template = element_at_path(doc, &from.block_path)
        .ok_or_else(|| EditError::MissingElement(from.block_path.clone()))?
        .clone();
    let (head, rest) = split_inline_children(&template.children, from.offset);

    let mut ops = Vec::new();
    let tail = if from.block_path == to.block_path {
        let to_offset = to.offset.max(from.offset);
        split_inline_children(&template.children, to_offset).1
    } else if let Some(tail) = sibling_tail(editor, &from, &to, &mut ops) {
        tail
    } else {
        rest
    };

    Ok(Cut {
        block_path: from.block_path,
        template,
        head,
        tail,
        ops,
    })
}

fn sibling_tail(
    editor: &Editor,
    from: &ResolvedPos,
    to: &ResolvedPos,
    ops: &mut Vec<Op>,
) -> Option<Vec<Node>> {
    let (from_ix, from_parent) = from.block_path.split_last()?;
    let (to_ix, to_parent) = to.block_path.split_last()?;
    if from_parent != to_parent || to_ix <= from_ix {
        return None;
    }
    let to_el = element_at_path(editor.doc(), &to.block_path)?;
    let (_, tail) = split_inline_children(&to_el.children, to.offset);
    for ix in (from_ix + 1..=*to_ix).rev() {
        ops.push(Op::RemoveNode {
            path: child_path(from_parent, ix),
        });
    }
    Some(tail)
}

fn collapsed_at(path: Path, offset: usize) -> Selection {
    Selection::collapsed(Point::new(path, offset))
}

/// Types `text` over the selection.
pub fn insert_text(editor: &Editor, text: &str) -> Result<Transaction, EditError> {
    let selection = editor.selection();
    if selection.is_collapsed() {
        let pos = resolve(editor.doc(), &selection.focus).ok_or(EditError::NotInTextBlock)?;
        let children = children_at_path(editor.doc(), &pos.block_path)
            .ok_or_else(|| EditError::MissingElement(pos.block_path.clone()))?;
        let point = insertion_point(&pos.block_path, children, pos.offset);
        let after = collapsed_at(point.path.clone(), point.offset + text.len());
        return Ok(Transaction::new(vec![Op::InsertText {
            path: point.path,
            offset: point.offset,
            text: text.to_string(),
        }])
        .selection_after(after)
        .source("input:text"));
    }

    let cut = cut_selection(editor)?;
    let marks = marks_between(&cut.head, &cut.tail);
    let cursor = cut.head_len() + text.len();
    let mut children = cut.head.clone();
    children.push(Node::marked_text(text, marks));
    children.extend(cut.tail.iter().cloned());

    let block_path = cut.block_path.clone();
    let point = point_for_global_offset(&block_path, &children, cursor);
    let node = block_with(&cut.template, children);
    Ok(Transaction::new(cut.replace(vec![node]))
        .selection_after(Selection::collapsed(point))
        .source("input:replace_selection"))
}

/// Deletes the selected content; `None` when the selection is collapsed.
pub fn delete_selection(editor: &Editor) -> Result<Option<Transaction>, EditError> {
    if editor.selection().is_collapsed() {
        return Ok(None);
    }
    let cut = cut_selection(editor)?;
    let cursor = cut.head_len();
    let mut children = cut.head.clone();
    children.extend(cut.tail.iter().cloned());

    let point = point_for_global_offset(&cut.block_path, &children, cursor);
    let node = block_with(&cut.template, children);
    Ok(Some(
        Transaction::new(cut.replace(vec![node]))
            .selection_after(Selection::collapsed(point))
            .source("edit:delete_selection"),
    ))
}

fn remove_range_ops(block_path: &[usize], children: &[Node], start: usize, end: usize) -> Vec<Op> {
    let mut ops = Vec::new();
    let mut cursor = 0usize;
    for (ix, node) in children.iter().enumerate() {
        let Node::Text(t) = node else {
            continue;
        };
        let node_start = cursor;
        let node_end = cursor + t.text.len();
        cursor = node_end;
        if node_end <= start || node_start >= end {
            continue;
        }
        let local_start = start.saturating_sub(node_start);
        let local_end = (end - node_start).min(t.text.len());
        ops.push(Op::RemoveText {
            path: child_path(block_path, ix),
            range: local_start..local_end,
        });
    }
    ops.reverse();
    ops
}

fn prev_boundary(text: &str, offset: usize) -> usize {
    text[..offset]
        .char_indices()
        .next_back()
        .map(|(ix, _)| ix)
        .unwrap_or(0)
}

fn next_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .chars()
        .next()
        .map(|c| offset + c.len_utf8())
        .unwrap_or(text.len())
}

fn join_blocks(editor: &Editor, left_path: &[usize], right_path: &[usize]) -> Option<Transaction> {
    let doc = editor.doc();
    let left = element_at_path(doc, left_path)?;
    let right = element_at_path(doc, right_path)?;
    if !editor.schema().is_text_block(left) || !editor.schema().is_text_block(right) {
        return None;
    }

    let cursor = text_len(&left.children);
    let mut children = left.children.clone();
    children.extend(right.children.iter().cloned());
    let point = point_for_global_offset(left_path, &children, cursor);
    let joined = block_with(left, children);

    Some(
        Transaction::new(vec![
            Op::RemoveNode {
                path: right_path.to_vec(),
            },
            Op::RemoveNode {
                path: left_path.to_vec(),
            },
            Op::InsertNode {
                path: left_path.to_vec(),
                node: joined,
            },
        ])
        .selection_after(Selection::collapsed(point)),
    )
}

/// Backspace: deletes the selection, the previous character, or joins the
/// block with the text block (or divider) before it.
pub fn delete_backward(editor: &Editor) -> Result<Option<Transaction>, EditError> {
    if !editor.selection().is_collapsed() {
        return delete_selection(editor);
    }
    let doc = editor.doc();
    let pos = resolve(doc, &editor.selection().focus).ok_or(EditError::NotInTextBlock)?;
    let children = children_at_path(doc, &pos.block_path)
        .ok_or_else(|| EditError::MissingElement(pos.block_path.clone()))?;

    if pos.offset > 0 {
        let start = prev_boundary(&pos.text, pos.offset);
        let point = point_for_global_offset(&pos.block_path, children, start);
        return Ok(Some(
            Transaction::new(remove_range_ops(&pos.block_path, children, start, pos.offset))
                .selection_after(Selection::collapsed(point))
                .source("key:backspace"),
        ));
    }

    let Some((&ix, _)) = pos.block_path.split_last() else {
        return Ok(None);
    };
    if ix == 0 {
        return Ok(None);
    }
    let prev_path = sibling_path_back(&pos.block_path);
    match node_at_path(doc, &prev_path) {
        Some(Node::Void(_)) => Ok(Some(
            Transaction::new(vec![Op::RemoveNode { path: prev_path }]).source("key:backspace:void"),
        )),
        Some(Node::Element(_)) => Ok(join_blocks(editor, &prev_path, &pos.block_path)
            .map(|tx| tx.source("key:backspace:join"))),
        _ => Ok(None),
    }
}

/// Delete: the forward counterpart of [`delete_backward`].
pub fn delete_forward(editor: &Editor) -> Result<Option<Transaction>, EditError> {
    if !editor.selection().is_collapsed() {
        return delete_selection(editor);
    }
    let doc = editor.doc();
    let pos = resolve(doc, &editor.selection().focus).ok_or(EditError::NotInTextBlock)?;
    let children = children_at_path(doc, &pos.block_path)
        .ok_or_else(|| EditError::MissingElement(pos.block_path.clone()))?;

    if !pos.at_end() {
        let end = next_boundary(&pos.text, pos.offset);
        let point = point_for_global_offset(&pos.block_path, children, pos.offset);
        return Ok(Some(
            Transaction::new(remove_range_ops(&pos.block_path, children, pos.offset, end))
                .selection_after(Selection::collapsed(point))
                .source("key:delete"),
        ));
    }

    let next_path = sibling_path(&pos.block_path, 1);
    match node_at_path(doc, &next_path) {
        Some(Node::Void(_)) => Ok(Some(
            Transaction::new(vec![Op::RemoveNode { path: next_path }]).source("key:delete:void"),
        )),
        Some(Node::Element(_)) => Ok(join_blocks(editor, &pos.block_path, &next_path)
            .map(|tx| tx.source("key:delete:join"))),
        _ => Ok(None),
    }
}

fn sibling_path_back(path: &[usize]) -> Path {
    let mut out = path.to_vec();
    if let Some(last) = out.last_mut() {
        *last = last.saturating_sub(1);
    }
    out
}

/// Enter: splits the text block at the cursor.
///
/// Code blocks take a newline instead. Inside a list item the item itself is
/// split, and an empty item leaves the list as a paragraph. A heading split
/// at its end continues with a paragraph.
pub fn split_block(editor: &Editor) -> Result<Transaction, EditError> {
    let cut = cut_selection(editor)?;
    let doc = editor.doc();
    let head_len = cut.head_len();

    if cut.template.kind == "code_block" {
        let mut children = cut.head.clone();
        children.push(Node::marked_text("\n", marks_between(&cut.head, &cut.tail)));
        children.extend(cut.tail.iter().cloned());
        let point = point_for_global_offset(&cut.block_path, &children, head_len + 1);
        let node = block_with(&cut.template, children);
        return Ok(Transaction::new(cut.replace(vec![node]))
            .selection_after(Selection::collapsed(point))
            .source("key:enter:code_newline"));
    }

    let parent_path = cut.block_path.split_last().map(|(_, p)| p.to_vec()).unwrap_or_default();
    let item_path = ancestor_of_kind(doc, &cut.block_path, "list_item")
        .filter(|item| *item == parent_path);

    if let Some(item_path) = item_path {
        let is_empty = head_len == 0 && text_len(&cut.tail) == 0;
        let item_is_single_block = element_at_path(doc, &item_path)
            .is_some_and(|item| item.children.len() == 1);
        if is_empty && item_is_single_block && cut.ops.is_empty() {
            return Ok(exit_list(editor, &item_path));
        }

        let head = block_with(&cut.template, cut.head.clone());
        let new_item = Node::list_item(vec![block_with(&cut.template, cut.tail.clone())]);
        let next_item_path = sibling_path(&item_path, 1);
        let mut ops = cut.replace(vec![head]);
        ops.push(Op::InsertNode {
            path: next_item_path.clone(),
            node: new_item,
        });
        return Ok(Transaction::new(ops)
            .selection_after(collapsed_at(child_path(&child_path(&next_item_path, 0), 0), 0))
            .source("key:enter:split_list_item"));
    }

    let tail_template = if cut.template.kind == "heading" && text_len(&cut.tail) == 0 {
        ElementNode {
            kind: "paragraph".to_string(),
            attrs: Default::default(),
            children: Vec::new(),
        }
    } else {
        cut.template.clone()
    };
    let head = block_with(&cut.template, cut.head.clone());
    let tail = block_with(&tail_template, cut.tail.clone());
    let new_block_path = sibling_path(&cut.block_path, 1);
    Ok(Transaction::new(cut.replace(vec![head, tail]))
        .selection_after(collapsed_at(child_path(&new_block_path, 0), 0))
        .source("key:enter:split_block"))
}

/// Turns an empty list item into a paragraph after its list.
fn exit_list(editor: &Editor, item_path: &[usize]) -> Transaction {
    let list_path = item_path.split_last().map(|(_, p)| p.to_vec()).unwrap_or_default();
    let single_item = element_at_path(editor.doc(), &list_path)
        .is_some_and(|list| list.children.len() == 1);

    let (ops, paragraph_path) = if single_item {
        (
            vec![
                Op::RemoveNode {
                    path: list_path.clone(),
                },
                Op::InsertNode {
                    path: list_path.clone(),
                    node: Node::paragraph(""),
                },
            ],
            list_path,
        )
    } else {
        let after_list = sibling_path(&list_path, 1);
        (
            vec![
                Op::RemoveNode {
                    path: item_path.to_vec(),
                },
                Op::InsertNode {
                    path: after_list.clone(),
                    node: Node::paragraph(""),
                },
            ],
            after_list,
        )
    };
    Transaction::new(ops)
        .selection_after(collapsed_at(child_path(&paragraph_path, 0), 0))
        .source("key:enter:exit_list")
}

/// Ops that replace the selection with a block node, and where it lands.
#[derive(Debug, Clone)]
pub struct BlockInsertion {
    pub ops: Vec<Op>,
    pub path: Path,
    /// First text position inside the inserted node, if it has one.
    pub cursor: Option<Point>,
}

/// Deletes the selection, then places `node` relative to the enclosing text
/// block: an empty paragraph is replaced, a cursor at the block start inserts
/// before it, at the end inserts after it, and in the middle splits it.
pub fn replace_selection_with(editor: &Editor, node: Node) -> Result<BlockInsertion, EditError> {
    let cut = cut_selection(editor)?;
    let head_empty = text_len(&cut.head) == 0;
    let tail_empty = text_len(&cut.tail) == 0;
    let block_path = cut.block_path.clone();

    let head = block_with(&cut.template, cut.head.clone());
    let tail = block_with(&cut.template, cut.tail.clone());
    let (replacement, delta) = if cut.template.kind == "paragraph" && head_empty && tail_empty {
        (vec![node.clone()], 0)
    } else if head_empty {
        (vec![node.clone(), tail], 0)
    } else if tail_empty {
        (vec![head, node.clone()], 1)
    } else {
        (vec![head, node.clone(), tail], 1)
    };

    let path = sibling_path(&block_path, delta);
    let cursor = first_text_point_in(&node, &path);
    Ok(BlockInsertion {
        ops: cut.replace(replacement),
        path,
        cursor,
    })
}

/// Replaces the text block at `block_path` with `template`'s kind and attrs,
/// keeping its inline content and the selection.
pub fn set_block_type(
    editor: &Editor,
    block_path: &[usize],
    template: ElementNode,
) -> Result<Transaction, EditError> {
    let el = element_at_path(editor.doc(), block_path)
        .ok_or_else(|| EditError::MissingElement(block_path.to_vec()))?;
    let node = block_with(&template, el.children.clone());
    Ok(Transaction::new(vec![
        Op::RemoveNode {
            path: block_path.to_vec(),
        },
        Op::InsertNode {
            path: block_path.to_vec(),
            node,
        },
    ])
    .selection_after(editor.selection().clone()))
}

/// Wraps the block at `block_path` in a new `kind` element. Points inside the
/// block gain one path level.
pub fn wrap_block(editor: &Editor, block_path: &[usize], kind: &str) -> Result<Transaction, EditError> {
    let block = node_at_path(editor.doc(), block_path)
        .ok_or_else(|| EditError::MissingElement(block_path.to_vec()))?
        .clone();
    let wrapped = Node::element(kind, vec![block]);

    let remap = |point: &Point| -> Point {
        if point.path.len() > block_path.len() && point.path.starts_with(block_path) {
            let mut path = block_path.to_vec();
            path.push(0);
            path.extend_from_slice(&point.path[block_path.len()..]);
            Point::new(path, point.offset)
        } else {
            point.clone()
        }
    };
    let selection = editor.selection();
    let selection_after = Selection {
        anchor: remap(&selection.anchor),
        focus: remap(&selection.focus),
    };

    Ok(Transaction::new(vec![
        Op::RemoveNode {
            path: block_path.to_vec(),
        },
        Op::InsertNode {
            path: block_path.to_vec(),
            node: wrapped,
        },
    ])
    .selection_after(selection_after))
}
