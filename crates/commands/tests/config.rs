use std::path::Path;

use scriptum_commands::{ConfigError, ShellConfig, Theme};

#[test]
fn missing_fields_fall_back_to_defaults() {
    let config = ShellConfig::from_json_str(r#"{ "theme": "dark", "slash_menu_limit": 5 }"#).unwrap();
    assert_eq!(config.theme, Theme::Dark);
    assert_eq!(config.slash_menu_limit, 5);
    assert_eq!(config.document_title, "Untitled Document");
    assert_eq!(config.footer_hint, "Type '/' for commands");
}

#[test]
fn empty_object_is_the_default_config() {
    assert_eq!(ShellConfig::from_json_str("{}").unwrap(), ShellConfig::default());
}

#[test]
fn invalid_json_is_a_parse_error() {
    let err = ShellConfig::from_json_str(r#"{ "theme": "sepia" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = ShellConfig::load(Path::new("/nonexistent/scriptum.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn config_round_trips_through_json() {
    let value = serde_json::to_value(ShellConfig::default()).unwrap();
    assert_eq!(value["theme"], serde_json::json!("light"));
    assert_eq!(value["slash_menu_limit"], serde_json::json!(8));
}
