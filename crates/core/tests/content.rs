use scriptum_core::{
    ContentError, DEFAULT_CONTENT, Document, Node, ScriptumValue, parse_content,
};
use serde_json::json;

#[test]
fn missing_content_uses_the_default_paragraph() {
    let doc = parse_content(None).unwrap();
    assert_eq!(doc.children, vec![Node::paragraph(DEFAULT_CONTENT)]);
}

#[test]
fn plain_text_becomes_one_paragraph_per_line() {
    let doc = parse_content(Some("first\nsecond")).unwrap();
    assert_eq!(
        doc.children,
        vec![Node::paragraph("first"), Node::paragraph("second")]
    );
}

#[test]
fn json_envelope_is_loaded() {
    let value = json!({
        "schema": "scriptum",
        "version": 1,
        "document": {
            "children": [
                {
                    "node": "element",
                    "kind": "heading",
                    "attrs": { "level": 2 },
                    "children": [{ "node": "text", "text": "Notes" }]
                },
                { "node": "void", "kind": "divider" }
            ]
        }
    });
    let doc = parse_content(Some(&value.to_string())).unwrap();

    assert_eq!(
        doc.children,
        vec![Node::heading(2, vec![Node::text("Notes")]), Node::divider()]
    );
}

#[test]
fn serialized_envelope_loads_back() {
    let value = ScriptumValue::from_document(Document::new(vec![Node::paragraph("hi")]));
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(ScriptumValue::from_json_str(&json).unwrap(), value);
}

#[test]
fn foreign_schema_is_rejected() {
    let value = json!({ "schema": "other", "document": { "children": [] } });
    let err = parse_content(Some(&value.to_string())).unwrap_err();
    assert!(matches!(err, ContentError::UnsupportedSchema(schema) if schema == "other"));
}

#[test]
fn malformed_json_is_an_error() {
    let err = parse_content(Some("{ not json")).unwrap_err();
    assert!(matches!(err, ContentError::Json(_)));
}
