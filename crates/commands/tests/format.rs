use scriptum_commands::{
    ActionOutcome, EditorView, FLOATING_TOOLBAR_BUTTONS, FormatAction, HeadlessView, mark_active,
    run_format, toggle_mark,
};
use scriptum_core::{Document, Editor, MarkKind, Marks, Node, Point, Selection};

fn view_selecting(text: &str, from: usize, to: usize) -> HeadlessView {
    HeadlessView::new(Editor::new(
        Document::new(vec![Node::paragraph(text)]),
        Selection {
            anchor: Point::new(vec![0, 0], from),
            focus: Point::new(vec![0, 0], to),
        },
    ))
}

#[test]
fn bold_applies_to_the_selected_range_only() {
    let mut view = view_selecting("Hello", 0, 2);
    assert_eq!(toggle_mark(MarkKind::Bold, Some(&mut view)), ActionOutcome::Applied);

    let bold = Marks {
        bold: true,
        ..Marks::default()
    };
    assert_eq!(
        view.state().doc().children,
        vec![Node::element(
            "paragraph",
            vec![Node::marked_text("He", bold), Node::text("llo")]
        )]
    );
    assert!(mark_active(MarkKind::Bold, &view));
    assert!(!mark_active(MarkKind::Italic, &view));
}

#[test]
fn bold_on_a_partly_bold_range_bolds_all_of_it() {
    let bold = Marks {
        bold: true,
        ..Marks::default()
    };
    let mut view = HeadlessView::new(Editor::new(
        Document::new(vec![Node::element(
            "paragraph",
            vec![Node::marked_text("He", bold), Node::text("llo")],
        )]),
        Selection {
            anchor: Point::new(vec![0, 0], 0),
            focus: Point::new(vec![0, 1], 3),
        },
    ));
    assert_eq!(toggle_mark(MarkKind::Bold, Some(&mut view)), ActionOutcome::Applied);

    assert_eq!(
        view.state().doc().children,
        vec![Node::element("paragraph", vec![Node::marked_text("Hello", bold)])]
    );
    assert!(mark_active(MarkKind::Bold, &view));
}

#[test]
fn toggling_a_fully_marked_range_removes_the_mark() {
    let mut view = view_selecting("Hello", 0, 2);
    toggle_mark(MarkKind::Italic, Some(&mut view));
    toggle_mark(MarkKind::Italic, Some(&mut view));

    assert_eq!(view.state().doc().children, vec![Node::paragraph("Hello")]);
    assert!(!mark_active(MarkKind::Italic, &view));
}

#[test]
fn collapsed_selection_is_left_unchanged() {
    let mut view = view_selecting("Hello", 3, 3);
    assert_eq!(toggle_mark(MarkKind::Code, Some(&mut view)), ActionOutcome::Unchanged);
    assert!(!view.state().can_undo());
}

#[test]
fn link_button_is_a_placeholder() {
    let mut view = view_selecting("Hello", 0, 5);
    let link = FLOATING_TOOLBAR_BUTTONS
        .iter()
        .find(|b| b.id == "link")
        .unwrap();
    assert_eq!(link.action, FormatAction::Link);
    assert_eq!(run_format(link.action, Some(&mut view)), ActionOutcome::Pending);
    assert_eq!(view.state().doc().children, vec![Node::paragraph("Hello")]);
}

#[test]
fn toolbar_buttons_in_order() {
    let labels: Vec<_> = FLOATING_TOOLBAR_BUTTONS.iter().map(|b| b.label).collect();
    assert_eq!(labels, vec!["B", "I", "</>", "Link"]);
}
