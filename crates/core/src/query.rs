use crate::core::{Document, ElementNode, Node, Point, Selection, clamp_to_char_boundary};
use crate::editor::Editor;
use crate::ops::Path;
use crate::schema::{Schema, for_each_text_block};

pub fn node_at_path<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Node> {
    let (first, rest) = path.split_first()?;
    let mut node = doc.children.get(*first)?;
    for &ix in rest {
        node = match node {
            Node::Element(el) => el.children.get(ix)?,
            Node::Void(_) | Node::Text(_) => return None,
        };
    }
    Some(node)
}

pub fn element_at_path<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a ElementNode> {
    node_at_path(doc, path).and_then(Node::as_element)
}

/// Children of the container at `parent_path`; the empty path is the document.
pub fn children_at_path<'a>(doc: &'a Document, parent_path: &[usize]) -> Option<&'a [Node]> {
    if parent_path.is_empty() {
        return Some(&doc.children);
    }
    element_at_path(doc, parent_path).map(|el| el.children.as_slice())
}

pub fn is_point_in_block(point: &Point, block_path: &[usize]) -> bool {
    point.path.len() == block_path.len() + 1 && point.path.starts_with(block_path)
}

/// Text leaves of a block as `(child index, block offset of the leaf, text)`.
pub(crate) fn text_leaves(children: &[Node]) -> impl Iterator<Item = (usize, usize, &str)> {
    children
        .iter()
        .enumerate()
        .filter_map(|(ix, node)| match node {
            Node::Text(t) => Some((ix, t.text.as_str())),
            Node::Element(_) | Node::Void(_) => None,
        })
        .scan(0usize, |next, (ix, text)| {
            let start = *next;
            *next += text.len();
            Some((ix, start, text))
        })
}

fn leaf_point(block_path: &[usize], child_ix: usize, offset: usize) -> Point {
    let mut path = block_path.to_vec();
    path.push(child_ix);
    Point::new(path, offset)
}

pub fn text_len(children: &[Node]) -> usize {
    text_leaves(children).map(|(_, _, text)| text.len()).sum()
}

/// Concatenated text of a text block's leaves.
pub fn block_text(children: &[Node]) -> String {
    text_leaves(children).map(|(_, _, text)| text).collect()
}

/// Block-global offset of `offset` inside the leaf at `child_ix`.
pub fn point_global_offset(children: &[Node], child_ix: usize, offset: usize) -> usize {
    match text_leaves(children).find(|&(ix, ..)| ix >= child_ix) {
        Some((ix, start, text)) if ix == child_ix => start + clamp_to_char_boundary(text, offset),
        Some((_, start, _)) => start,
        None => text_len(children),
    }
}

/// Leaf point for a block-global offset. At a leaf boundary the point lands
/// at the start of the following leaf.
pub fn point_for_global_offset(block_path: &[usize], children: &[Node], global_offset: usize) -> Point {
    for (ix, start, text) in text_leaves(children) {
        let local = global_offset.saturating_sub(start);
        if local < text.len() {
            return leaf_point(block_path, ix, clamp_to_char_boundary(text, local));
        }
        if local == text.len() {
            return match children.get(ix + 1) {
                Some(Node::Text(_)) => leaf_point(block_path, ix + 1, 0),
                _ => leaf_point(block_path, ix, text.len()),
            };
        }
    }

    // Past the end: last text leaf, at its end.
    match text_leaves(children).last() {
        Some((ix, _, text)) => leaf_point(block_path, ix, text.len()),
        None => leaf_point(block_path, 0, 0),
    }
}

/// Like [`point_for_global_offset`], but at a leaf boundary the point stays
/// at the end of the preceding leaf, so inserted text inherits its marks.
pub fn insertion_point(block_path: &[usize], children: &[Node], global_offset: usize) -> Point {
    text_leaves(children)
        .find(|&(_, start, text)| global_offset <= start + text.len())
        .map(|(ix, start, text)| {
            let local = global_offset.saturating_sub(start);
            leaf_point(block_path, ix, clamp_to_char_boundary(text, local))
        })
        .unwrap_or_else(|| point_for_global_offset(block_path, children, global_offset))
}

/// Selection points in document order.
pub fn ordered_selection_points(sel: &Selection) -> (Point, Point) {
    let (anchor, focus) = (&sel.anchor, &sel.focus);
    if (&focus.path, focus.offset) < (&anchor.path, anchor.offset) {
        (focus.clone(), anchor.clone())
    } else {
        (anchor.clone(), focus.clone())
    }
}

pub struct TextBlock<'a> {
    pub path: Path,
    pub el: &'a ElementNode,
}

pub fn text_blocks_in_order<'a>(doc: &'a Document, schema: &Schema) -> Vec<TextBlock<'a>> {
    let mut out = Vec::new();
    for_each_text_block(&doc.children, &mut Vec::new(), schema, &mut |el, path| {
        out.push(TextBlock {
            path: path.to_vec(),
            el,
        })
    });
    out
}

/// Where a point sits, seen from its enclosing text block.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPos {
    pub block_path: Path,
    pub kind: String,
    /// Block-global byte offset.
    pub offset: usize,
    pub text: String,
}

impl ResolvedPos {
    pub fn text_before(&self) -> &str {
        &self.text[..self.offset]
    }

    pub fn at_start(&self) -> bool {
        self.offset == 0
    }

    pub fn at_end(&self) -> bool {
        self.offset == self.text.len()
    }
}

pub fn resolve(doc: &Document, point: &Point) -> Option<ResolvedPos> {
    let (leaf_ix, block_path) = point.path.split_last()?;
    let el = element_at_path(doc, block_path)?;
    let children = el.children.as_slice();
    if !matches!(children.get(*leaf_ix), Some(Node::Text(_))) {
        return None;
    }
    let text = block_text(children);
    let offset = clamp_to_char_boundary(&text, point_global_offset(children, *leaf_ix, point.offset));
    Some(ResolvedPos {
        block_path: block_path.to_vec(),
        kind: el.kind.clone(),
        offset,
        text,
    })
}

/// Path of the closest ancestor of `path` (excluding itself) with the given kind.
pub fn ancestor_of_kind(doc: &Document, path: &[usize], kind: &str) -> Option<Path> {
    (1..path.len())
        .rev()
        .map(|len| &path[..len])
        .find(|prefix| element_at_path(doc, prefix).is_some_and(|el| el.kind == kind))
        .map(<[usize]>::to_vec)
}

impl Editor {
    pub fn resolve(&self, point: &Point) -> Option<ResolvedPos> {
        resolve(self.doc(), point)
    }

    pub fn resolved_focus(&self) -> Option<ResolvedPos> {
        self.resolve(&self.selection().focus)
    }

    pub fn text_blocks(&self) -> Vec<TextBlock<'_>> {
        text_blocks_in_order(self.doc(), self.schema())
    }

    /// The concatenated plain text of every text block, one per line.
    pub fn plain_text(&self) -> String {
        self.text_blocks()
            .iter()
            .map(|b| block_text(&b.el.children))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
