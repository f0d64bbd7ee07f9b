use scriptum_core::{ApplyError, Editor, Node, Op, Point, Selection, Transaction};

fn insert_at_end(editor: &mut Editor, text: &str) {
    let len = editor.plain_text().len();
    let tx = Transaction::new(vec![Op::InsertText {
        path: vec![0, 0],
        offset: len,
        text: text.to_string(),
    }])
    .selection_after(Selection::collapsed(Point::new(vec![0, 0], len + text.len())))
    .source("test:insert_text");
    editor.apply(tx).unwrap();
}

#[test]
fn undo_and_redo_insert_text() {
    let mut editor = Editor::with_text("Hello");
    insert_at_end(&mut editor, " world");
    assert_eq!(editor.plain_text(), "Hello world");
    assert!(editor.can_undo());

    assert!(editor.undo());
    assert_eq!(editor.plain_text(), "Hello");
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 0));
    assert!(editor.can_redo());

    assert!(editor.redo());
    assert_eq!(editor.plain_text(), "Hello world");
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 11));
}

#[test]
fn undo_on_fresh_editor_is_a_no_op() {
    let mut editor = Editor::with_text("Hello");
    assert!(!editor.can_undo());
    assert!(!editor.undo());
    assert!(!editor.redo());
}

#[test]
fn new_transaction_clears_redo_stack() {
    let mut editor = Editor::with_text("a");
    insert_at_end(&mut editor, "b");
    assert!(editor.undo());
    assert!(editor.can_redo());

    insert_at_end(&mut editor, "c");
    assert!(!editor.can_redo());
    assert_eq!(editor.plain_text(), "ac");
}

#[test]
fn undo_history_is_bounded() {
    let mut editor = Editor::with_text("");
    editor.config_mut().history_limit = 2;
    insert_at_end(&mut editor, "a");
    insert_at_end(&mut editor, "b");
    insert_at_end(&mut editor, "c");

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(!editor.undo());
    assert_eq!(editor.plain_text(), "a");
}

#[test]
fn undo_restores_replaced_block() {
    let mut editor = Editor::with_text("Title");
    let tx = Transaction::new(vec![
        Op::RemoveNode { path: vec![0] },
        Op::InsertNode {
            path: vec![0],
            node: Node::heading(1, vec![Node::text("Title")]),
        },
    ])
    .source("test:set_heading");
    editor.apply(tx).unwrap();
    assert_eq!(editor.doc().children[0].kind(), Some("heading"));

    assert!(editor.undo());
    assert_eq!(editor.doc().children[0], Node::paragraph("Title"));
}

#[test]
fn invalid_path_is_rejected_without_changes() {
    let mut editor = Editor::with_text("Hello");
    let before = editor.doc().clone();

    let tx = Transaction::new(vec![
        Op::InsertText {
            path: vec![0, 0],
            offset: 0,
            text: "ok ".into(),
        },
        Op::InsertText {
            path: vec![4, 0],
            offset: 0,
            text: "nope".into(),
        },
    ]);
    let err = editor.apply(tx).unwrap_err();

    assert!(matches!(err, ApplyError::Path(_)));
    assert_eq!(editor.doc(), &before);
    assert!(!editor.can_undo());
}

#[test]
fn selection_only_transaction_does_not_record_history() {
    let mut editor = Editor::with_text("Hello");
    let tx = Transaction::new(Vec::new())
        .selection_after(Selection::collapsed(Point::new(vec![0, 0], 3)));
    editor.apply(tx).unwrap();

    assert_eq!(editor.selection().focus.offset, 3);
    assert!(!editor.can_undo());
}
