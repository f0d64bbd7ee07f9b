use scriptum_commands::{BlockAction, Category, CommandAction, CommandRegistry, add_menu_sections};

#[test]
fn builtin_catalog_keeps_declaration_order() {
    let registry = CommandRegistry::builtin();
    let ids: Vec<_> = registry.commands().iter().map(|c| c.id).collect();
    assert_eq!(
        ids,
        vec![
            "heading1",
            "heading2",
            "heading3",
            "bullet",
            "numbered",
            "checklist",
            "quote",
            "code-block",
            "divider",
            "table",
            "image",
            "video",
            "link",
        ]
    );
}

#[test]
fn grouping_follows_first_appearance() {
    let registry = CommandRegistry::builtin();
    let categories: Vec<_> = registry.grouped().iter().map(|g| g.category).collect();
    assert_eq!(
        categories,
        vec![
            Category::Text,
            Category::List,
            Category::Separator,
            Category::Advanced,
            Category::Media,
            Category::Embed,
        ]
    );

    let text: Vec<_> = registry.grouped()[0].commands.iter().map(|c| c.id).collect();
    assert_eq!(text, vec!["heading1", "heading2", "heading3", "quote", "code-block"]);

    let total: usize = registry.grouped().iter().map(|g| g.commands.len()).sum();
    assert_eq!(total, registry.commands().len());
}

#[test]
fn lookup_by_id() {
    let registry = CommandRegistry::global();
    let heading = registry.get("heading2").unwrap();
    assert_eq!(heading.label, "Heading 2");
    assert_eq!(
        heading.action,
        CommandAction::Implemented(BlockAction::Heading { level: 2 })
    );
    assert!(registry.get("table").unwrap().is_pending());
    assert!(registry.get("missing").is_none());
}

#[test]
fn add_menu_sections_have_titles() {
    let sections = add_menu_sections(CommandRegistry::global());
    let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Text & Formatting", "Lists", "Layout", "Advanced", "Media", "Embed"]
    );
    assert_eq!(sections[4].commands.len(), 2);
}

#[test]
fn block_actions_serialize_with_a_tag() {
    let value = serde_json::to_value(BlockAction::Heading { level: 3 }).unwrap();
    assert_eq!(value, serde_json::json!({ "block": "heading", "level": 3 }));
    let value = serde_json::to_value(BlockAction::CodeBlock).unwrap();
    assert_eq!(value, serde_json::json!({ "block": "code_block" }));
}
