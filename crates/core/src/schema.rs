use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{
    AttrPatch, Attrs, Document, ElementNode, Node, Point, Selection, clamp_to_char_boundary,
};
use crate::ops::Op;
use crate::query::node_at_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Block,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildConstraint {
    None,
    BlockOnly,
    InlineOnly,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: String,
    pub role: NodeRole,
    pub is_void: bool,
    pub children: ChildConstraint,
}

impl NodeSpec {
    fn block(kind: &str, children: ChildConstraint) -> Self {
        Self {
            kind: kind.to_string(),
            role: NodeRole::Block,
            is_void: false,
            children,
        }
    }

    fn void(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            role: NodeRole::Block,
            is_void: true,
            children: ChildConstraint::None,
        }
    }
}

/// A repair step. `run` returns the ops that fix whatever the pass looks
/// for, computed against `doc` as given; an empty list means nothing to do.
pub trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document, schema: &Schema) -> Vec<Op>;
}

/// Node kinds the document may contain, plus the passes that repair it.
pub struct Schema {
    node_specs: HashMap<String, NodeSpec>,
    normalize_passes: Vec<Box<dyn NormalizePass>>,
}

impl Schema {
    pub fn new(
        node_specs: impl IntoIterator<Item = NodeSpec>,
        normalize_passes: Vec<Box<dyn NormalizePass>>,
    ) -> Self {
        Self {
            node_specs: node_specs
                .into_iter()
                .map(|spec| (spec.kind.clone(), spec))
                .collect(),
            normalize_passes,
        }
    }

    /// Paragraphs, headings, code blocks, quotes, lists and dividers.
    pub fn basic() -> Self {
        Self::new(
            [
                NodeSpec::block("paragraph", ChildConstraint::InlineOnly),
                NodeSpec::block("heading", ChildConstraint::InlineOnly),
                NodeSpec::block("code_block", ChildConstraint::InlineOnly),
                NodeSpec::block("blockquote", ChildConstraint::BlockOnly),
                NodeSpec::block("bullet_list", ChildConstraint::BlockOnly),
                NodeSpec::block("ordered_list", ChildConstraint::BlockOnly),
                NodeSpec::block("list_item", ChildConstraint::BlockOnly),
                NodeSpec::void("divider"),
            ],
            vec![
                Box::new(NonEmptyDocument),
                Box::new(TextBlockLeaf),
                Box::new(MergeTextLeaves),
                Box::new(DropEmptyLeaves),
                Box::new(FillEmptyContainers),
                Box::new(ClampHeadingLevels),
            ],
        )
    }

    pub fn node_spec(&self, kind: &str) -> Option<&NodeSpec> {
        self.node_specs.get(kind)
    }

    pub fn is_known_kind(&self, kind: &str) -> bool {
        self.node_specs.contains_key(kind)
    }

    pub fn is_text_block(&self, el: &ElementNode) -> bool {
        child_constraint(self, el) == ChildConstraint::InlineOnly
    }

    /// Ops from the first pass that finds something to repair.
    ///
    /// Passes compute paths against the same snapshot, so only one pass may
    /// contribute per round; the editor loops until no pass reports work.
    pub fn normalize(&self, doc: &Document) -> Vec<Op> {
        for pass in &self.normalize_passes {
            let ops = pass.run(doc, self);
            if !ops.is_empty() {
                tracing::trace!(pass = pass.id(), ops = ops.len(), "normalize");
                return ops;
            }
        }
        Vec::new()
    }

    /// Moves both points onto existing text. A point that no longer fits
    /// takes the other one's place; with neither, the first text position in
    /// the document is used.
    pub fn normalize_selection(&self, doc: &Document, selection: &Selection) -> Selection {
        let anchor = clamp_point(doc, &selection.anchor);
        let focus = clamp_point(doc, &selection.focus);
        match (anchor, focus) {
            (Some(anchor), Some(focus)) => Selection { anchor, focus },
            (Some(point), None) | (None, Some(point)) => Selection::collapsed(point),
            (None, None) => Selection::collapsed(
                first_text_point(doc).unwrap_or_else(|| Point::new(vec![0], 0)),
            ),
        }
    }
}

fn child_constraint(schema: &Schema, el: &ElementNode) -> ChildConstraint {
    schema
        .node_specs
        .get(&el.kind)
        .map(|s| s.children.clone())
        .unwrap_or_else(|| {
            if el.children.iter().any(|n| matches!(n, Node::Text(_))) {
                ChildConstraint::InlineOnly
            } else {
                ChildConstraint::Any
            }
        })
}

/// First text position inside `node`, which lives at `path`.
pub fn first_text_point_in(node: &Node, path: &[usize]) -> Option<Point> {
    match node {
        Node::Text(_) => Some(Point::new(path.to_vec(), 0)),
        Node::Element(el) => el.children.iter().enumerate().find_map(|(ix, child)| {
            let mut child_path = path.to_vec();
            child_path.push(ix);
            first_text_point_in(child, &child_path)
        }),
        Node::Void(_) => None,
    }
}

pub fn first_text_point(doc: &Document) -> Option<Point> {
    doc.children
        .iter()
        .enumerate()
        .find_map(|(ix, node)| first_text_point_in(node, &[ix]))
}

/// Nearest text position to `point`. Indices are clamped level by level
/// until a text leaf is reached; a walk that stops on an element descends to
/// its first text, one that stops on a void moves to a neighbour.
fn clamp_point(doc: &Document, point: &Point) -> Option<Point> {
    let mut path = Vec::with_capacity(point.path.len());
    let mut children = doc.children.as_slice();
    let mut reached = None;

    for &wanted in &point.path {
        let Some(last) = children.len().checked_sub(1) else {
            break;
        };
        let ix = wanted.min(last);
        path.push(ix);
        let node = &children[ix];
        reached = Some(node);
        match node {
            Node::Text(leaf) => {
                let offset = clamp_to_char_boundary(&leaf.text, point.offset);
                return Some(Point::new(path, offset));
            }
            Node::Element(el) => children = &el.children,
            Node::Void(_) => break,
        }
    }

    match reached? {
        Node::Void(_) => next_text_point_after(doc, &path),
        node => first_text_point_in(node, &path),
    }
}

/// A point resting on a void (a divider) moves to the next text block, or
/// back to the previous one at the end of the document.
fn next_text_point_after(doc: &Document, path: &[usize]) -> Option<Point> {
    let (last, parent) = path.split_last()?;
    let siblings: &[Node] = if parent.is_empty() {
        &doc.children
    } else {
        match node_at_path(doc, parent)? {
            Node::Element(el) => &el.children,
            _ => return None,
        }
    };

    let after = siblings.iter().enumerate().skip(last + 1);
    let before = siblings.iter().enumerate().take(*last).rev();
    after.chain(before).find_map(|(ix, node)| {
        let mut sibling_path = parent.to_vec();
        sibling_path.push(ix);
        first_text_point_in(node, &sibling_path)
    })
}

struct NonEmptyDocument;

impl NormalizePass for NonEmptyDocument {
    fn id(&self) -> &'static str {
        "schema.non_empty_document"
    }

    fn run(&self, doc: &Document, _schema: &Schema) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertNode {
                path: vec![0],
                node: Node::paragraph(""),
            }];
        }
        Vec::new()
    }
}

/// Calls `visit` for every text block in document order, with its path.
pub(crate) fn for_each_text_block<'a>(
    children: &'a [Node],
    path: &mut Vec<usize>,
    schema: &Schema,
    visit: &mut dyn FnMut(&'a ElementNode, &[usize]),
) {
    for (ix, node) in children.iter().enumerate() {
        let Node::Element(el) = node else {
            continue;
        };
        path.push(ix);
        if schema.is_text_block(el) {
            visit(el, path);
        } else {
            for_each_text_block(&el.children, path, schema, visit);
        }
        path.pop();
    }
}

struct TextBlockLeaf;

impl NormalizePass for TextBlockLeaf {
    fn id(&self) -> &'static str {
        "schema.text_block_leaf"
    }

    fn run(&self, doc: &Document, schema: &Schema) -> Vec<Op> {
        let mut ops = Vec::new();
        for_each_text_block(&doc.children, &mut Vec::new(), schema, &mut |el, path| {
            if !el.children.iter().any(|n| matches!(n, Node::Text(_))) {
                let mut insert_path = path.to_vec();
                insert_path.push(0);
                ops.push(Op::InsertNode {
                    path: insert_path,
                    node: Node::text(""),
                });
            }
        });
        ops
    }
}

struct MergeTextLeaves;

impl NormalizePass for MergeTextLeaves {
    fn id(&self) -> &'static str {
        "schema.merge_text_leaves"
    }

    fn run(&self, doc: &Document, schema: &Schema) -> Vec<Op> {
        let mut ops = Vec::new();
        for_each_text_block(&doc.children, &mut Vec::new(), schema, &mut |el, path| {
            // Right to left, so the merged leaf always keeps the lower index.
            let mut carried = String::new();
            for ix in (1..el.children.len()).rev() {
                let (Node::Text(left), Node::Text(right)) = (&el.children[ix - 1], &el.children[ix])
                else {
                    carried.clear();
                    continue;
                };
                if left.marks != right.marks {
                    carried.clear();
                    continue;
                }

                let merged = format!("{}{}", right.text, carried);
                let mut left_path = path.to_vec();
                left_path.push(ix - 1);
                let mut right_path = path.to_vec();
                right_path.push(ix);
                if !merged.is_empty() {
                    ops.push(Op::InsertText {
                        path: left_path,
                        offset: left.text.len(),
                        text: merged.clone(),
                    });
                }
                ops.push(Op::RemoveNode { path: right_path });
                carried = merged;
            }
        });
        ops
    }
}

struct DropEmptyLeaves;

impl NormalizePass for DropEmptyLeaves {
    fn id(&self) -> &'static str {
        "schema.drop_empty_leaves"
    }

    fn run(&self, doc: &Document, schema: &Schema) -> Vec<Op> {
        let mut ops = Vec::new();
        for_each_text_block(&doc.children, &mut Vec::new(), schema, &mut |el, path| {
            let empty: Vec<usize> = el
                .children
                .iter()
                .enumerate()
                .filter(|(_, n)| matches!(n, Node::Text(t) if t.text.is_empty()))
                .map(|(ix, _)| ix)
                .collect();
            if empty.is_empty() {
                return;
            }
            // One leaf has to stay so the block can hold a cursor.
            let keep_one = empty.len() == el.children.len();
            for &ix in empty.iter().skip(usize::from(keep_one)).rev() {
                let mut remove_path = path.to_vec();
                remove_path.push(ix);
                ops.push(Op::RemoveNode { path: remove_path });
            }
        });
        ops
    }
}

struct FillEmptyContainers;

impl NormalizePass for FillEmptyContainers {
    fn id(&self) -> &'static str {
        "schema.fill_empty_containers"
    }

    fn run(&self, doc: &Document, schema: &Schema) -> Vec<Op> {
        let mut ops = Vec::new();

        fn walk(children: &[Node], path: &mut Vec<usize>, schema: &Schema, ops: &mut Vec<Op>) {
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };
                if schema.is_text_block(el) {
                    continue;
                }

                path.push(ix);
                if el.children.is_empty() {
                    let filler = match el.kind.as_str() {
                        "bullet_list" | "ordered_list" => {
                            Some(Node::list_item(vec![Node::paragraph("")]))
                        }
                        "blockquote" | "list_item" => Some(Node::paragraph("")),
                        _ => None,
                    };
                    if let Some(node) = filler {
                        let mut insert_path = path.clone();
                        insert_path.push(0);
                        ops.push(Op::InsertNode {
                            path: insert_path,
                            node,
                        });
                    }
                } else {
                    walk(&el.children, path, schema, ops);
                }
                path.pop();
            }
        }

        walk(&doc.children, &mut Vec::new(), schema, &mut ops);
        ops
    }
}

struct ClampHeadingLevels;

impl NormalizePass for ClampHeadingLevels {
    fn id(&self) -> &'static str {
        "schema.clamp_heading_levels"
    }

    fn run(&self, doc: &Document, schema: &Schema) -> Vec<Op> {
        let mut ops = Vec::new();
        for_each_text_block(&doc.children, &mut Vec::new(), schema, &mut |el, path| {
            if el.kind != "heading" {
                return;
            }
            let current = el.attrs.get("level").and_then(|v| v.as_u64());
            let level = current.unwrap_or(1).clamp(1, 6);
            if current != Some(level) {
                let mut set = Attrs::default();
                set.insert("level".to_string(), serde_json::Value::from(level));
                ops.push(Op::SetNodeAttrs {
                    path: path.to_vec(),
                    patch: AttrPatch {
                        set,
                        remove: Vec::new(),
                    },
                });
            }
        });
        ops
    }
}
