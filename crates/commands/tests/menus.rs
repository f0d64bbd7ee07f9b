use scriptum_commands::{CommandRegistry, DEFAULT_SLASH_MENU_LIMIT, SlashMenu, slash_matches};

fn ids(query: &str, limit: usize) -> Vec<&'static str> {
    slash_matches(CommandRegistry::global(), query, limit)
        .iter()
        .map(|c| c.id)
        .collect()
}

#[test]
fn query_matches_label_or_description() {
    assert_eq!(ids("head", 8), vec!["heading1", "heading2", "heading3"]);
    assert_eq!(ids("list", 8), vec!["bullet", "numbered", "checklist"]);
}

#[test]
fn matching_ignores_case() {
    assert_eq!(ids("QUOTE", 8), vec!["quote"]);
    assert_eq!(ids("Embed", 8), vec!["video", "link"]);
}

#[test]
fn empty_query_is_capped_at_the_limit() {
    let all = ids("", DEFAULT_SLASH_MENU_LIMIT);
    assert_eq!(all.len(), 8);
    assert_eq!(all.first(), Some(&"heading1"));
    assert_eq!(all.last(), Some(&"code-block"));
}

#[test]
fn unknown_query_matches_nothing() {
    let menu = SlashMenu::new(CommandRegistry::global(), "zzz", 8);
    assert!(menu.is_empty());
    assert!(menu.highlighted_command().is_none());
}

#[test]
fn highlight_wraps_and_clamps() {
    let mut menu = SlashMenu::new(CommandRegistry::global(), "head", 8);
    assert_eq!(menu.highlighted_command().unwrap().id, "heading1");

    menu.move_up();
    assert_eq!(menu.highlighted_command().unwrap().id, "heading3");
    menu.move_down();
    assert_eq!(menu.highlighted_command().unwrap().id, "heading1");

    menu.highlight(42);
    assert_eq!(menu.highlighted, 2);
}
