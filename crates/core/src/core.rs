use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ops::Path;

pub type Attrs = BTreeMap<String, serde_json::Value>;
pub type ElementKind = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
    Void(VoidNode),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode {
            text: text.into(),
            marks: Marks::default(),
        })
    }

    pub fn marked_text(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(TextNode {
            text: text.into(),
            marks,
        })
    }

    pub fn element(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            kind: kind.into(),
            attrs: Attrs::default(),
            children,
        })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::element("paragraph", vec![Self::text(text)])
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        let mut attrs = Attrs::default();
        attrs.insert("level".to_string(), serde_json::Value::from(level));
        Node::Element(ElementNode {
            kind: "heading".to_string(),
            attrs,
            children,
        })
    }

    pub fn code_block(text: impl Into<String>) -> Self {
        Self::element("code_block", vec![Self::text(text)])
    }

    pub fn blockquote(children: Vec<Node>) -> Self {
        Self::element("blockquote", children)
    }

    pub fn list_item(children: Vec<Node>) -> Self {
        Self::element("list_item", children)
    }

    pub fn bullet_list(items: Vec<Node>) -> Self {
        Self::element("bullet_list", items)
    }

    pub fn ordered_list(items: Vec<Node>) -> Self {
        Self::element("ordered_list", items)
    }

    pub fn divider() -> Self {
        Node::Void(VoidNode {
            kind: "divider".to_string(),
            attrs: Attrs::default(),
        })
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            Node::Element(el) => Some(el.kind.as_str()),
            Node::Void(v) => Some(v.kind.as_str()),
            Node::Text(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn heading_level(&self) -> Option<u64> {
        (self.kind == "heading")
            .then(|| self.attrs.get("level").and_then(|v| v.as_u64()))
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default)]
    pub marks: Marks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Marks {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }

    /// Path of the element holding this point's text leaf.
    pub fn block_path(&self) -> &[usize] {
        self.path.split_last().map(|(_, p)| p).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

/// Why a path does not address a node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty path")]
    Empty,
    #[error("index {index} out of bounds at depth {depth} (len {len})")]
    OutOfBounds { depth: usize, index: usize, len: usize },
    #[error("node at depth {depth} has no children")]
    Leaf { depth: usize },
}

impl Document {
    /// Child list of the container at `parent`; the root list for an empty
    /// path.
    fn children_at_mut(&mut self, parent: &[usize]) -> Result<&mut Vec<Node>, PathError> {
        let mut children = &mut self.children;
        for (depth, &index) in parent.iter().enumerate() {
            let len = children.len();
            children = match children.get_mut(index) {
                Some(Node::Element(el)) => &mut el.children,
                Some(_) => return Err(PathError::Leaf { depth }),
                None => return Err(PathError::OutOfBounds { depth, index, len }),
            };
        }
        Ok(children)
    }

    pub(crate) fn node_mut(&mut self, path: &[usize]) -> Result<&mut Node, PathError> {
        let (&index, parent) = path.split_last().ok_or(PathError::Empty)?;
        let depth = parent.len();
        let children = self.children_at_mut(parent)?;
        let len = children.len();
        children
            .get_mut(index)
            .ok_or(PathError::OutOfBounds { depth, index, len })
    }

    pub(crate) fn insert_child(&mut self, path: &[usize], node: Node) -> Result<(), PathError> {
        let (&index, parent) = path.split_last().ok_or(PathError::Empty)?;
        let depth = parent.len();
        let children = self.children_at_mut(parent)?;
        if index > children.len() {
            let len = children.len();
            return Err(PathError::OutOfBounds { depth, index, len });
        }
        children.insert(index, node);
        Ok(())
    }

    pub(crate) fn remove_child(&mut self, path: &[usize]) -> Result<Node, PathError> {
        let (&index, parent) = path.split_last().ok_or(PathError::Empty)?;
        let depth = parent.len();
        let children = self.children_at_mut(parent)?;
        if index >= children.len() {
            let len = children.len();
            return Err(PathError::OutOfBounds { depth, index, len });
        }
        Ok(children.remove(index))
    }
}

/// Attribute changes for [`crate::Op::SetNodeAttrs`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttrPatch {
    #[serde(default)]
    pub set: Attrs,
    #[serde(default)]
    pub remove: Vec<String>,
}

impl AttrPatch {
    /// Applies the patch and returns the patch that restores `attrs`.
    pub(crate) fn apply_to(&self, attrs: &mut Attrs) -> AttrPatch {
        let mut restore = AttrPatch::default();
        for (key, value) in &self.set {
            match attrs.insert(key.clone(), value.clone()) {
                Some(prev) => {
                    restore.set.insert(key.clone(), prev);
                }
                None => restore.remove.push(key.clone()),
            }
        }
        for key in &self.remove {
            if let Some(prev) = attrs.remove(key) {
                restore.set.insert(key.clone(), prev);
            }
        }
        restore
    }
}

pub(crate) fn clamp_to_char_boundary(s: &str, ix: usize) -> usize {
    let mut ix = ix.min(s.len());
    while !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}
