//! Loading settings-editor.toml

use settings_editor::config::{
    discover, load_from_path, load_from_str, ConfigError, EditorConfig, ValidationIssue,
    CONFIG_FILE_NAME,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_full_config() {
    let toml = r#"
root = "/srv/dayz/TerjeSettings"
history_file = "/var/lib/settings-editor/history.json"
history_limit = 50
"#;
    let config = load_from_str(toml).unwrap();
    assert_eq!(config.root, PathBuf::from("/srv/dayz/TerjeSettings"));
    assert_eq!(
        config.history_file,
        PathBuf::from("/var/lib/settings-editor/history.json")
    );
    assert_eq!(config.history_limit, 50);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = load_from_str("history_limit = 5\n").unwrap();
    let defaults = EditorConfig::default();
    assert_eq!(config.root, defaults.root);
    assert_eq!(config.history_file, defaults.history_file);
    assert_eq!(config.history_limit, 5);
}

#[test]
fn test_validation_reports_every_issue() {
    let err = load_from_str("root = \"\"\nhistory_limit = 0\n").unwrap_err();
    let ConfigError::Invalid { source, .. } = err else {
        panic!("expected validation error");
    };
    assert_eq!(
        source.issues,
        vec![
            ValidationIssue::EmptyPath { field: "root" },
            ValidationIssue::ZeroLimit {
                field: "history_limit"
            },
        ]
    );
    assert_eq!(source.to_string().lines().count(), 2);
}

#[test]
fn test_wrong_type_is_toml_error() {
    let err = load_from_str("history_limit = \"many\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_discover_reads_file_in_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "root = \"Settings\"\nhistory_limit = 3\n",
    )
    .unwrap();

    let config = discover(dir.path()).unwrap();
    assert_eq!(config.root, dir.path().join("Settings"));
    assert_eq!(config.history_file, dir.path().join("settings_history.json"));
    assert_eq!(config.history_limit, 3);
}

#[test]
fn test_missing_explicit_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = load_from_path(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
