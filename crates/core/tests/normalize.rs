use scriptum_core::{
    Attrs, Document, Editor, ElementNode, Marks, Node, Point, Selection,
};
use serde_json::json;

fn editor_with(children: Vec<Node>, focus: Point) -> Editor {
    Editor::new(Document::new(children), Selection::collapsed(focus))
}

fn attrs(value: serde_json::Value) -> Attrs {
    serde_json::from_value(value).unwrap()
}

fn bold() -> Marks {
    Marks {
        bold: true,
        ..Marks::default()
    }
}

#[test]
fn empty_document_gets_a_paragraph() {
    let editor = editor_with(Vec::new(), Point::new(vec![0, 0], 0));
    assert_eq!(editor.doc().children, vec![Node::paragraph("")]);
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 0));
}

#[test]
fn text_block_without_leaf_gets_one() {
    let editor = editor_with(
        vec![Node::element("paragraph", Vec::new())],
        Point::new(vec![0, 0], 0),
    );
    assert_eq!(editor.doc().children, vec![Node::paragraph("")]);
}

#[test]
fn adjacent_leaves_with_equal_marks_merge() {
    let editor = editor_with(
        vec![Node::element(
            "paragraph",
            vec![Node::text("a"), Node::text("b"), Node::text("c")],
        )],
        Point::new(vec![0, 2], 1),
    );

    assert_eq!(editor.doc().children, vec![Node::paragraph("abc")]);
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 3));
}

#[test]
fn leaves_with_different_marks_stay_apart() {
    let children = vec![Node::element(
        "paragraph",
        vec![Node::marked_text("bold", bold()), Node::text(" plain")],
    )];
    let editor = editor_with(children.clone(), Point::new(vec![0, 0], 0));
    assert_eq!(editor.doc().children, children);
}

#[test]
fn empty_leaf_next_to_text_is_dropped() {
    let editor = editor_with(
        vec![Node::element(
            "paragraph",
            vec![Node::text(""), Node::marked_text("x", bold())],
        )],
        Point::new(vec![0, 1], 1),
    );

    let Node::Element(el) = &editor.doc().children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(el.children, vec![Node::marked_text("x", bold())]);
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 1));
}

#[test]
fn heading_levels_are_clamped() {
    let heading = |level: serde_json::Value| {
        Node::Element(ElementNode {
            kind: "heading".into(),
            attrs: attrs(level),
            children: vec![Node::text("T")],
        })
    };
    let editor = editor_with(
        vec![heading(json!({ "level": 9 })), heading(json!({}))],
        Point::new(vec![0, 0], 0),
    );

    let levels: Vec<Option<u64>> = editor
        .doc()
        .children
        .iter()
        .map(|n| n.as_element().and_then(|el| el.heading_level()))
        .collect();
    assert_eq!(levels, vec![Some(6), Some(1)]);
}

#[test]
fn empty_containers_are_filled() {
    let editor = editor_with(
        vec![
            Node::blockquote(Vec::new()),
            Node::bullet_list(Vec::new()),
        ],
        Point::new(vec![0, 0, 0], 0),
    );

    assert_eq!(
        editor.doc().children,
        vec![
            Node::blockquote(vec![Node::paragraph("")]),
            Node::bullet_list(vec![Node::list_item(vec![Node::paragraph("")])]),
        ]
    );
}

#[test]
fn cursor_on_divider_moves_to_next_text_block() {
    let editor = editor_with(
        vec![Node::divider(), Node::paragraph("after")],
        Point::new(vec![0], 0),
    );
    assert_eq!(editor.selection().focus, Point::new(vec![1, 0], 0));
}

#[test]
fn cursor_past_document_end_is_clamped() {
    let editor = editor_with(vec![Node::paragraph("abc")], Point::new(vec![3, 0], 10));
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 3));
}
