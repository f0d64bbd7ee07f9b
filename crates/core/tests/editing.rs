use scriptum_core::{
    Document, Editor, Marks, Node, Point, Selection, delete_backward, delete_forward,
    insert_text, replace_selection_with, split_block,
};

fn editor_at(children: Vec<Node>, path: Vec<usize>, offset: usize) -> Editor {
    Editor::new(
        Document::new(children),
        Selection::collapsed(Point::new(path, offset)),
    )
}

fn bold() -> Marks {
    Marks {
        bold: true,
        ..Marks::default()
    }
}

#[test]
fn typing_inserts_at_the_cursor() {
    let mut editor = editor_at(vec![Node::paragraph("Hllo")], vec![0, 0], 1);
    let tx = insert_text(&editor, "e").unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(editor.plain_text(), "Hello");
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 2));
}

#[test]
fn typing_after_bold_text_continues_bold() {
    let mut editor = editor_at(
        vec![Node::element(
            "paragraph",
            vec![Node::marked_text("he", bold()), Node::text("llo")],
        )],
        vec![0, 1],
        0,
    );
    let tx = insert_text(&editor, "y").unwrap();
    editor.apply(tx).unwrap();

    let el = editor.doc().children[0].as_element().unwrap();
    assert_eq!(el.children[0], Node::marked_text("hey", bold()));
}

#[test]
fn typing_over_a_selection_replaces_it() {
    let mut editor = editor_at(vec![Node::paragraph("Hello world")], vec![0, 0], 0);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 6),
        focus: Point::new(vec![0, 0], 11),
    });
    let tx = insert_text(&editor, "there").unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(editor.plain_text(), "Hello there");
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 11));
}

#[test]
fn enter_splits_a_paragraph() {
    let mut editor = editor_at(vec![Node::paragraph("Hello world")], vec![0, 0], 5);
    let tx = split_block(&editor).unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(
        editor.doc().children,
        vec![Node::paragraph("Hello"), Node::paragraph(" world")]
    );
    assert_eq!(editor.selection().focus, Point::new(vec![1, 0], 0));
}

#[test]
fn enter_at_end_of_heading_continues_with_paragraph() {
    let mut editor = editor_at(
        vec![Node::heading(2, vec![Node::text("Title")])],
        vec![0, 0],
        5,
    );
    let tx = split_block(&editor).unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(editor.doc().children[0].kind(), Some("heading"));
    assert_eq!(editor.doc().children[1], Node::paragraph(""));
}

#[test]
fn enter_in_code_block_inserts_newline() {
    let mut editor = editor_at(vec![Node::code_block("ab")], vec![0, 0], 1);
    let tx = split_block(&editor).unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(editor.doc().children, vec![Node::code_block("a\nb")]);
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 2));
}

#[test]
fn enter_in_list_item_adds_an_item() {
    let mut editor = editor_at(
        vec![Node::bullet_list(vec![Node::list_item(vec![
            Node::paragraph("one"),
        ])])],
        vec![0, 0, 0, 0],
        3,
    );
    let tx = split_block(&editor).unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(
        editor.doc().children,
        vec![Node::bullet_list(vec![
            Node::list_item(vec![Node::paragraph("one")]),
            Node::list_item(vec![Node::paragraph("")]),
        ])]
    );
    assert_eq!(editor.selection().focus, Point::new(vec![0, 1, 0, 0], 0));
}

#[test]
fn enter_in_empty_sole_list_item_leaves_the_list() {
    let mut editor = editor_at(
        vec![Node::bullet_list(vec![Node::list_item(vec![
            Node::paragraph(""),
        ])])],
        vec![0, 0, 0, 0],
        0,
    );
    let tx = split_block(&editor).unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("")]);
}

#[test]
fn backspace_at_block_start_joins_with_previous_paragraph() {
    let mut editor = editor_at(
        vec![Node::paragraph("ab"), Node::paragraph("cd")],
        vec![1, 0],
        0,
    );
    let tx = delete_backward(&editor).unwrap().unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("abcd")]);
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 2));
}

#[test]
fn backspace_after_divider_removes_it() {
    let mut editor = editor_at(
        vec![Node::paragraph("a"), Node::divider(), Node::paragraph("b")],
        vec![2, 0],
        0,
    );
    let tx = delete_backward(&editor).unwrap().unwrap();
    editor.apply(tx).unwrap();

    assert_eq!(
        editor.doc().children,
        vec![Node::paragraph("a"), Node::paragraph("b")]
    );
    assert_eq!(editor.selection().focus, Point::new(vec![1, 0], 0));
}

#[test]
fn backspace_at_document_start_does_nothing() {
    let editor = editor_at(vec![Node::paragraph("a")], vec![0, 0], 0);
    assert!(delete_backward(&editor).unwrap().is_none());
}

#[test]
fn delete_removes_the_next_character() {
    let mut editor = editor_at(vec![Node::paragraph("héllo")], vec![0, 0], 1);
    let tx = delete_forward(&editor).unwrap().unwrap();
    editor.apply(tx).unwrap();
    assert_eq!(editor.plain_text(), "hllo");
}

#[test]
fn block_replaces_an_empty_paragraph() {
    let editor = editor_at(vec![Node::paragraph("")], vec![0, 0], 0);
    let insertion = replace_selection_with(&editor, Node::code_block("")).unwrap();

    assert_eq!(insertion.path, vec![0]);
    assert_eq!(insertion.cursor, Some(Point::new(vec![0, 0], 0)));

    let mut editor = editor;
    editor
        .apply(scriptum_core::Transaction::new(insertion.ops))
        .unwrap();
    assert_eq!(editor.doc().children, vec![Node::code_block("")]);
}

#[test]
fn block_in_the_middle_splits_the_paragraph() {
    let mut editor = editor_at(vec![Node::paragraph("Hello world")], vec![0, 0], 5);
    let insertion = replace_selection_with(&editor, Node::divider()).unwrap();
    assert_eq!(insertion.path, vec![1]);
    assert_eq!(insertion.cursor, None);

    editor
        .apply(scriptum_core::Transaction::new(insertion.ops))
        .unwrap();
    assert_eq!(
        editor.doc().children,
        vec![
            Node::paragraph("Hello"),
            Node::divider(),
            Node::paragraph(" world"),
        ]
    );
}

#[test]
fn block_at_paragraph_start_goes_before_it() {
    let mut editor = editor_at(vec![Node::paragraph("text")], vec![0, 0], 0);
    let insertion = replace_selection_with(&editor, Node::code_block("")).unwrap();
    assert_eq!(insertion.path, vec![0]);

    editor
        .apply(scriptum_core::Transaction::new(insertion.ops))
        .unwrap();
    assert_eq!(
        editor.doc().children,
        vec![Node::code_block(""), Node::paragraph("text")]
    );
}

#[test]
fn block_at_paragraph_end_goes_after_it() {
    let mut editor = editor_at(vec![Node::paragraph("text")], vec![0, 0], 4);
    let insertion = replace_selection_with(&editor, Node::code_block("")).unwrap();
    assert_eq!(insertion.path, vec![1]);

    editor
        .apply(scriptum_core::Transaction::new(insertion.ops))
        .unwrap();
    assert_eq!(
        editor.doc().children,
        vec![Node::paragraph("text"), Node::code_block("")]
    );
}

#[test]
fn block_replaces_the_selected_text() {
    let mut editor = editor_at(vec![Node::paragraph("ab"), Node::paragraph("cd")], vec![0, 0], 0);
    editor.set_selection(Selection {
        anchor: Point::new(vec![0, 0], 1),
        focus: Point::new(vec![1, 0], 1),
    });
    let insertion = replace_selection_with(&editor, Node::code_block("")).unwrap();
    editor
        .apply(scriptum_core::Transaction::new(insertion.ops))
        .unwrap();

    assert_eq!(
        editor.doc().children,
        vec![
            Node::paragraph("a"),
            Node::code_block(""),
            Node::paragraph("d"),
        ]
    );
}
