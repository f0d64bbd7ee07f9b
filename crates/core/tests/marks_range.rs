use scriptum_core::{
    Document, Editor, MarkKind, Marks, Node, Point, Selection, range_fully_marked, set_mark_range,
};

fn range(anchor: (Vec<usize>, usize), focus: (Vec<usize>, usize)) -> Selection {
    Selection {
        anchor: Point::new(anchor.0, anchor.1),
        focus: Point::new(focus.0, focus.1),
    }
}

fn editor_with(children: Vec<Node>, selection: Selection) -> Editor {
    Editor::new(Document::new(children), selection)
}

fn leaves(editor: &Editor, block: usize) -> Vec<Node> {
    editor.doc().children[block]
        .as_element()
        .map(|el| el.children.clone())
        .unwrap_or_default()
}

fn with(mark: MarkKind) -> Marks {
    mark.set(Marks::default(), true)
}

#[test]
fn bold_splits_the_leaf_and_keeps_the_selection() {
    let mut editor = editor_with(
        vec![Node::paragraph("hello")],
        range((vec![0, 0], 0), (vec![0, 0], 2)),
    );
    let tx = set_mark_range(&editor, &editor.selection().clone(), MarkKind::Bold, true).unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(
        leaves(&editor, 0),
        vec![
            Node::marked_text("he", with(MarkKind::Bold)),
            Node::text("llo"),
        ]
    );
    assert_eq!(editor.selection().anchor, Point::new(vec![0, 0], 0));
    assert!(range_fully_marked(&editor, editor.selection(), MarkKind::Bold).unwrap());
}

#[test]
fn partially_marked_range_is_not_fully_marked() {
    let editor = editor_with(
        vec![Node::element(
            "paragraph",
            vec![
                Node::marked_text("he", with(MarkKind::Italic)),
                Node::text("llo"),
            ],
        )],
        range((vec![0, 0], 0), (vec![0, 1], 3)),
    );
    assert!(!range_fully_marked(&editor, editor.selection(), MarkKind::Italic).unwrap());
}

#[test]
fn removing_a_mark_merges_the_leaves_back() {
    let mut editor = editor_with(
        vec![Node::paragraph("hello")],
        range((vec![0, 0], 1), (vec![0, 0], 4)),
    );
    let sel = editor.selection().clone();
    let tx = set_mark_range(&editor, &sel, MarkKind::Code, true).unwrap();
    editor.apply(tx).unwrap();
    assert_eq!(leaves(&editor, 0).len(), 3);

    let sel = editor.selection().clone();
    let tx = set_mark_range(&editor, &sel, MarkKind::Code, false).unwrap();
    editor.apply(tx).unwrap();
    assert_eq!(leaves(&editor, 0), vec![Node::text("hello")]);
}

#[test]
fn marks_span_several_blocks() {
    let mut editor = editor_with(
        vec![Node::paragraph("ab"), Node::paragraph("cd")],
        range((vec![0, 0], 1), (vec![1, 0], 1)),
    );
    let sel = editor.selection().clone();
    let tx = set_mark_range(&editor, &sel, MarkKind::Italic, true).unwrap();
    editor.apply(tx).unwrap();

    let italic = with(MarkKind::Italic);
    assert_eq!(
        leaves(&editor, 0),
        vec![Node::text("a"), Node::marked_text("b", italic)]
    );
    assert_eq!(
        leaves(&editor, 1),
        vec![Node::marked_text("c", italic), Node::text("d")]
    );
}

#[test]
fn collapsed_selection_is_never_fully_marked() {
    let editor = editor_with(
        vec![Node::element(
            "paragraph",
            vec![Node::marked_text("bold", with(MarkKind::Bold))],
        )],
        range((vec![0, 0], 2), (vec![0, 0], 2)),
    );
    assert!(!range_fully_marked(&editor, editor.selection(), MarkKind::Bold).unwrap());
}
