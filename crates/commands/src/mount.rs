use std::collections::BTreeMap;

use scriptum_core::{ContentError, Editor, Point, Selection, first_text_point, parse_content};

#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("Element {0} not found")]
    ContainerNotFound(String),
    #[error("invalid initial content: {0}")]
    InvalidContent(#[from] ContentError),
}

/// Where an editor can be mounted: a window slot with its size.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            title: "Scriptum".to_string(),
            width: 960.0,
            height: 720.0,
        }
    }
}

/// Containers the embedding application offers, by selector.
#[derive(Debug, Clone, Default)]
pub struct ContainerRegistry {
    containers: BTreeMap<String, Container>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, selector: impl Into<String>, container: Container) {
        self.containers.insert(selector.into(), container);
    }

    pub fn resolve(&self, selector: &str) -> Result<&Container, MountError> {
        self.containers
            .get(selector)
            .ok_or_else(|| MountError::ContainerNotFound(selector.to_string()))
    }
}

/// Everything needed to open an editor: the resolved container and the
/// initial editor state.
pub struct MountPlan {
    pub container: Container,
    pub editor: Editor,
}

pub fn prepare_mount(
    registry: &ContainerRegistry,
    selector: &str,
    content: Option<&str>,
) -> Result<MountPlan, MountError> {
    let container = registry.resolve(selector)?.clone();
    let doc = parse_content(content)?;
    let start = first_text_point(&doc).unwrap_or_else(|| Point::new(vec![0, 0], 0));
    let editor = Editor::new(doc, Selection::collapsed(start));
    tracing::debug!(selector, blocks = editor.doc().children.len(), "prepared mount");
    Ok(MountPlan { container, editor })
}
