use scriptum_commands::{
    ActionOutcome, CommandRegistry, EditorView, HeadlessView, TODO_SEED, run_command,
};
use scriptum_core::{Document, Editor, Node, Point, Selection};

fn view_at(children: Vec<Node>, path: Vec<usize>, offset: usize) -> HeadlessView {
    HeadlessView::new(Editor::new(
        Document::new(children),
        Selection::collapsed(Point::new(path, offset)),
    ))
}

fn run(id: &str, view: &mut HeadlessView) -> ActionOutcome {
    let command = CommandRegistry::global().get(id).unwrap();
    run_command(command, Some(view))
}

#[test]
fn heading_retypes_the_current_paragraph() {
    let mut view = view_at(vec![Node::paragraph("Hello")], vec![0, 0], 2);
    assert_eq!(run("heading2", &mut view), ActionOutcome::Applied);

    let doc = view.state().doc();
    assert_eq!(doc.children, vec![Node::heading(2, vec![Node::text("Hello")])]);
    assert_eq!(view.state().selection().focus, Point::new(vec![0, 0], 2));
}

#[test]
fn heading_changes_level_of_an_existing_heading() {
    let mut view = view_at(
        vec![Node::heading(1, vec![Node::text("Title")])],
        vec![0, 0],
        0,
    );
    run("heading3", &mut view);
    assert_eq!(
        view.state().doc().children,
        vec![Node::heading(3, vec![Node::text("Title")])]
    );
}

#[test]
fn heading_inside_code_is_inserted_after_it() {
    let mut view = view_at(vec![Node::code_block("let x")], vec![0, 0], 5);
    run("heading1", &mut view);

    let doc = view.state().doc();
    assert_eq!(doc.children.len(), 2);
    assert_eq!(doc.children[0], Node::code_block("let x"));
    assert_eq!(doc.children[1].kind(), Some("heading"));
    assert_eq!(view.state().selection().focus, Point::new(vec![1, 0], 0));
}

#[test]
fn bullet_list_replaces_an_empty_paragraph() {
    let mut view = view_at(vec![Node::paragraph("")], vec![0, 0], 0);
    assert_eq!(run("bullet", &mut view), ActionOutcome::Applied);

    assert_eq!(
        view.state().doc().children,
        vec![Node::bullet_list(vec![Node::list_item(vec![
            Node::paragraph("")
        ])])]
    );
    assert_eq!(
        view.state().selection().focus,
        Point::new(vec![0, 0, 0, 0], 0)
    );
}

#[test]
fn numbered_list_goes_after_the_text() {
    let mut view = view_at(vec![Node::paragraph("Intro")], vec![0, 0], 5);
    run("numbered", &mut view);

    let doc = view.state().doc();
    assert_eq!(doc.children[0], Node::paragraph("Intro"));
    assert_eq!(doc.children[1].kind(), Some("ordered_list"));
}

#[test]
fn checklist_seeds_a_checkbox_and_puts_the_cursor_after_it() {
    let mut view = view_at(vec![Node::paragraph("")], vec![0, 0], 0);
    run("checklist", &mut view);

    assert_eq!(view.state().plain_text(), TODO_SEED);
    assert_eq!(
        view.state().selection().focus,
        Point::new(vec![0, 0, 0, 0], TODO_SEED.len())
    );
}

#[test]
fn quote_wraps_the_paragraph() {
    let mut view = view_at(vec![Node::paragraph("Hi")], vec![0, 0], 1);
    run("quote", &mut view);

    assert_eq!(
        view.state().doc().children,
        vec![Node::blockquote(vec![Node::paragraph("Hi")])]
    );
    assert_eq!(view.state().selection().focus, Point::new(vec![0, 0, 0], 1));
}

#[test]
fn code_block_is_inserted_with_the_cursor_inside() {
    let mut view = view_at(vec![Node::paragraph("abc")], vec![0, 0], 3);
    run("code-block", &mut view);

    let doc = view.state().doc();
    assert_eq!(doc.children, vec![Node::paragraph("abc"), Node::code_block("")]);
    assert_eq!(view.state().selection().focus, Point::new(vec![1, 0], 0));
}

#[test]
fn divider_replaces_the_paragraph_and_adds_an_empty_one() {
    let mut view = view_at(vec![Node::paragraph("Hello")], vec![0, 0], 5);
    assert_eq!(run("divider", &mut view), ActionOutcome::Applied);

    assert_eq!(
        view.state().doc().children,
        vec![Node::divider(), Node::paragraph("")]
    );
    assert_eq!(view.state().selection().focus, Point::new(vec![1, 0], 0));
}

#[test]
fn divider_mid_paragraph_does_not_split_the_text() {
    let mut view = view_at(
        vec![Node::paragraph("Before"), Node::paragraph("Hello")],
        vec![1, 0],
        3,
    );
    run("divider", &mut view);

    assert_eq!(
        view.state().doc().children,
        vec![Node::paragraph("Before"), Node::divider(), Node::paragraph("")]
    );
    assert_eq!(view.state().selection().focus, Point::new(vec![2, 0], 0));
}

#[test]
fn pending_commands_leave_the_document_alone() {
    let mut view = view_at(vec![Node::paragraph("Hello")], vec![0, 0], 5);
    let before = view.state().doc().clone();

    for id in ["table", "image", "video", "link"] {
        assert_eq!(run(id, &mut view), ActionOutcome::Pending);
    }
    assert_eq!(view.state().doc(), &before);
    assert!(!view.state().can_undo());
}

#[test]
fn missing_view_is_reported() {
    let command = CommandRegistry::global().get("heading1").unwrap();
    assert_eq!(run_command(command, None), ActionOutcome::NoView);
}

#[test]
fn commands_are_undoable_and_scroll_into_view() {
    let mut view = view_at(vec![Node::paragraph("Hello")], vec![0, 0], 0);
    run("quote", &mut view);
    assert_eq!(view.scroll_requests(), 1);

    assert!(view.editor_mut().undo());
    assert_eq!(view.state().doc().children, vec![Node::paragraph("Hello")]);
}
