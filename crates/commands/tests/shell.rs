use scriptum_commands::{
    ActionOutcome, Anchor, EditorView, HeadlessView, PointerTarget, ShellConfig, ShellKey,
    ShellState, SlashState, Theme,
};
use scriptum_core::{Editor, MarkKind, Node, Point, Selection, insert_text};

fn type_text(shell: &mut ShellState, view: &mut HeadlessView, text: &str) {
    shell.on_text_input();
    let tx = insert_text(view.state(), text).unwrap();
    view.dispatch(tx).unwrap();
    shell.on_state_change(view);
}

fn open_slash(query: &str) -> (ShellState, HeadlessView) {
    let mut shell = ShellState::default();
    let mut view = HeadlessView::new(Editor::with_text(""));
    type_text(&mut shell, &mut view, "/");
    if !query.is_empty() {
        type_text(&mut shell, &mut view, query);
    }
    (shell, view)
}

#[test]
fn typing_a_slash_opens_the_menu_below_the_cursor() {
    let (shell, _view) = open_slash("");
    assert!(shell.slash_menu().active);
    assert_eq!(shell.slash_menu().query, "");
    assert_eq!(shell.slash_menu().anchor, Anchor::new(8.0, 20.0));
    assert_eq!(shell.slash_menu_view().unwrap().matches.len(), 8);
}

#[test]
fn further_typing_filters_the_open_menu() {
    let (shell, _view) = open_slash("head");
    assert!(shell.slash_menu().active);
    assert_eq!(shell.slash_menu().query, "head");
    assert_eq!(shell.slash_menu().anchor, Anchor::new(8.0, 20.0));

    let ids: Vec<_> = shell
        .slash_menu_view()
        .unwrap()
        .matches
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["heading1", "heading2", "heading3"]);
}

#[test]
fn no_matches_renders_nothing() {
    let (shell, _view) = open_slash("zzz");
    assert!(shell.slash_menu().active);
    assert!(shell.slash_menu_view().is_none());
}

#[test]
fn escape_closes_everything() {
    let (mut shell, mut view) = open_slash("");
    shell.toggle_add_menu(Anchor::new(0.0, 0.0), Some(view.state()));
    assert!(shell.add_menu().active);
    assert!(!shell.slash_menu().active);

    assert!(shell.on_key_down(ShellKey::Escape, Some(&mut view)));
    assert!(!shell.add_menu().active);
    assert!(!shell.slash_menu().active);
    assert!(!shell.selection_toolbar().visible);

    assert!(!shell.on_key_down(ShellKey::Escape, Some(&mut view)));
}

#[test]
fn one_escape_closes_the_add_menu_and_the_selection_toolbar() {
    let mut shell = ShellState::default();
    let mut view = HeadlessView::new(Editor::with_text("Hello"));
    view.editor_mut().set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 3),
    });
    shell.on_state_change(&view);
    shell.toggle_add_menu(Anchor::new(0.0, 0.0), Some(view.state()));
    assert!(shell.add_menu().active);
    assert!(shell.selection_toolbar().visible);

    assert!(shell.on_key_down(ShellKey::Escape, Some(&mut view)));
    assert!(!shell.add_menu().active);
    assert!(!shell.slash_menu().active);
    assert!(!shell.selection_toolbar().visible);
}

#[test]
fn dismissed_menu_stays_closed_for_the_same_slash() {
    let (mut shell, mut view) = open_slash("");
    shell.on_key_down(ShellKey::Escape, Some(&mut view));

    view.editor_mut()
        .set_selection(Selection::collapsed(Point::new(vec![0, 0], 1)));
    shell.on_state_change(&view);
    assert!(!shell.slash_menu().active);
    assert_eq!(shell.slash_state(), &SlashState::Idle);
}

#[test]
fn a_new_slash_closes_the_add_menu() {
    let mut shell = ShellState::default();
    let mut view = HeadlessView::new(Editor::with_text(""));
    shell.toggle_add_menu(Anchor::new(10.0, 40.0), Some(view.state()));
    assert!(shell.add_menu().active);

    type_text(&mut shell, &mut view, "/");
    assert!(!shell.add_menu().active);
    assert!(shell.slash_menu().active);
}

#[test]
fn outside_click_closes_menus_without_touching_the_document() {
    let (mut shell, view) = open_slash("");
    let before = view.state().doc().clone();

    shell.on_pointer_down(PointerTarget::SlashMenu, Some(view.state()));
    assert!(shell.slash_menu().active);

    shell.on_pointer_down(PointerTarget::Document, Some(view.state()));
    assert!(!shell.slash_menu().active);
    assert_eq!(view.state().doc(), &before);

    shell.toggle_add_menu(Anchor::new(0.0, 0.0), Some(view.state()));
    shell.on_pointer_down(PointerTarget::AddMenu, Some(view.state()));
    assert!(shell.add_menu().active);
    shell.on_pointer_down(PointerTarget::Chrome, Some(view.state()));
    assert!(!shell.add_menu().active);
}

#[test]
fn add_button_toggles_the_menu() {
    let mut shell = ShellState::default();
    shell.toggle_add_menu(Anchor::new(0.0, 0.0), None);
    assert!(shell.add_menu().active);
    shell.toggle_add_menu(Anchor::new(0.0, 0.0), None);
    assert!(!shell.add_menu().active);
}

#[test]
fn selecting_a_command_runs_it_and_closes_the_menus() {
    let (mut shell, mut view) = open_slash("");
    let outcome = shell.select_command("heading1", Some(&mut view));

    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(shell.last_selected(), Some("heading1"));
    assert!(!shell.slash_menu().active);
    assert!(!shell.add_menu().active);
    assert_eq!(
        view.state().doc().children,
        vec![Node::heading(1, vec![Node::text("/")])]
    );

    shell.on_state_change(&view);
    assert!(!shell.slash_menu().active);
}

#[test]
fn choosing_from_the_add_menu_runs_the_command_then_closes_it() {
    let mut shell = ShellState::default();
    let mut view = HeadlessView::new(Editor::with_text("Intro"));
    shell.toggle_add_menu(Anchor::new(10.0, 40.0), Some(view.state()));

    let outcome = shell.select_command("quote", Some(&mut view));
    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(view.state().doc().children[0].kind(), Some("blockquote"));
    assert_eq!(shell.last_selected(), Some("quote"));
    assert!(!shell.add_menu().active);

    shell.toggle_add_menu(Anchor::new(10.0, 40.0), None);
    assert_eq!(shell.select_command("heading2", None), ActionOutcome::NoView);
    assert_eq!(shell.last_selected(), Some("heading2"));
    assert!(!shell.add_menu().active);
}

#[test]
fn pending_selection_still_closes_the_menu() {
    let (mut shell, mut view) = open_slash("");
    let outcome = shell.select_command("video", Some(&mut view));
    assert_eq!(outcome, ActionOutcome::Pending);
    assert_eq!(shell.last_selected(), Some("video"));
    assert!(!shell.slash_menu().active);
}

#[test]
fn unknown_command_is_rejected() {
    let mut shell = ShellState::default();
    assert!(matches!(
        shell.select_command("nope", None),
        ActionOutcome::Rejected(_)
    ));
    assert_eq!(shell.last_selected(), None);
}

#[test]
fn arrows_move_the_highlight_and_enter_selects() {
    let (mut shell, mut view) = open_slash("head");
    assert!(shell.on_key_down(ShellKey::ArrowDown, Some(&mut view)));
    assert!(shell.on_key_down(ShellKey::ArrowDown, Some(&mut view)));
    assert_eq!(shell.slash_menu_view().unwrap().highlighted, 2);

    assert!(shell.on_key_down(ShellKey::Enter, Some(&mut view)));
    assert_eq!(shell.last_selected(), Some("heading3"));
    assert_eq!(view.state().doc().children[0].kind(), Some("heading"));
}

#[test]
fn keys_pass_through_when_no_menu_is_open() {
    let mut shell = ShellState::default();
    let mut view = HeadlessView::new(Editor::with_text("hello"));
    assert!(!shell.on_key_down(ShellKey::Enter, Some(&mut view)));
    assert!(!shell.on_key_down(ShellKey::ArrowDown, Some(&mut view)));
    assert!(!shell.on_key_down(ShellKey::Other, Some(&mut view)));
}

#[test]
fn selection_toolbar_follows_range_selections() {
    let mut shell = ShellState::default();
    let mut view = HeadlessView::new(Editor::with_text("Hello world"));
    view.editor_mut().set_selection(Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 5),
    });
    shell.on_state_change(&view);
    assert!(shell.selection_toolbar().visible);
    assert_eq!(shell.selection_toolbar().anchor, Anchor::new(20.0, 0.0));

    assert_eq!(
        shell.apply_format(MarkKind::Bold, Some(&mut view)),
        ActionOutcome::Applied
    );

    view.editor_mut()
        .set_selection(Selection::collapsed(Point::new(vec![0, 0], 0)));
    shell.on_state_change(&view);
    assert!(!shell.selection_toolbar().visible);
}

#[test]
fn theme_comes_from_config_and_toggles() {
    let config = ShellConfig {
        theme: Theme::Dark,
        ..ShellConfig::default()
    };
    let mut shell = ShellState::new(&config);
    assert_eq!(shell.theme(), Theme::Dark);
    assert_eq!(shell.toggle_theme(), Theme::Light);
    assert_eq!(shell.toggle_theme(), Theme::Dark);
}
