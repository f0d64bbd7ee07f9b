use serde::{Deserialize, Serialize};

use crate::core::{Document, Node};

const DEFAULT_SCHEMA: &str = "scriptum";
const DEFAULT_VERSION: u32 = 1;

/// Text shown in a freshly mounted editor when no content is given.
pub const DEFAULT_CONTENT: &str = "Start writing your document...";

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

/// Versioned JSON envelope around a [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptumValue {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub document: Document,
}

impl ScriptumValue {
    pub fn from_document(document: Document) -> Self {
        Self {
            schema: default_schema(),
            version: default_version(),
            document,
        }
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("invalid document json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported document schema `{0}`")]
    UnsupportedSchema(String),
}

impl Document {
    /// One paragraph per line.
    pub fn from_plain_text(text: &str) -> Self {
        Document::new(text.lines().map(Node::paragraph).collect())
    }
}

/// Builds a document from initial content: a JSON envelope when the content
/// starts with `{`, plain text otherwise, and [`DEFAULT_CONTENT`] when absent.
pub fn parse_content(content: Option<&str>) -> Result<Document, ContentError> {
    let Some(content) = content else {
        return Ok(Document::new(vec![Node::paragraph(DEFAULT_CONTENT)]));
    };

    if !content.trim_start().starts_with('{') {
        return Ok(Document::from_plain_text(content));
    }

    let value = ScriptumValue::from_json_str(content)?;
    if value.schema != DEFAULT_SCHEMA {
        return Err(ContentError::UnsupportedSchema(value.schema));
    }
    Ok(value.into_document())
}
