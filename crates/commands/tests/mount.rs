use scriptum_commands::{Container, ContainerRegistry, MountError, prepare_mount};
use scriptum_core::{DEFAULT_CONTENT, Node, Point};

fn registry() -> ContainerRegistry {
    let mut registry = ContainerRegistry::new();
    registry.register("#editor", Container::default());
    registry
}

#[test]
fn unknown_selector_is_an_error() {
    let err = prepare_mount(&registry(), "#missing", None).err().unwrap();
    assert!(matches!(err, MountError::ContainerNotFound(_)));
    assert_eq!(err.to_string(), "Element #missing not found");
}

#[test]
fn default_content_is_used_when_none_is_given() {
    let plan = prepare_mount(&registry(), "#editor", None).unwrap();
    assert_eq!(plan.container, Container::default());
    assert_eq!(plan.editor.doc().children, vec![Node::paragraph(DEFAULT_CONTENT)]);
    assert_eq!(plan.editor.selection().focus, Point::new(vec![0, 0], 0));
}

#[test]
fn plain_text_content_becomes_paragraphs() {
    let plan = prepare_mount(&registry(), "#editor", Some("one\ntwo")).unwrap();
    assert_eq!(plan.editor.plain_text(), "one\ntwo");
}

#[test]
fn broken_json_content_is_rejected() {
    let err = prepare_mount(&registry(), "#editor", Some("{ not json")).err().unwrap();
    assert!(matches!(err, MountError::InvalidContent(_)));
}
