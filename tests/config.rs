//! Configuration system tests
//!
//! Tests for config paths, the settings record, its stores, and key parsing.

use mathveil::config::{JsonFileStore, MemoryStore, Settings, SettingsStore};
use mathveil::config_paths::ConfigPaths;
use mathveil::keymap::{parse_key_string, KeyCode, Keystroke, Modifiers};
use mathveil::plugin::MathMarkers;
use serde_json::json;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_discovered_root_is_app_dir() {
    if let Ok(paths) = ConfigPaths::discover() {
        assert_eq!(paths.root().file_name().unwrap(), "mathveil");
        assert!(paths.settings_file().starts_with(paths.root()));
    }
}

#[test]
fn test_store_from_paths_writes_under_root() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ConfigPaths::at(dir.path().join("mathveil"));

    let markers = MathMarkers::load(Box::new(paths.settings_store())).unwrap();
    assert_eq!(markers.settings(), &Settings::default());
    assert!(paths.settings_file().is_file());
    assert!(!paths.logs_dir().exists());
}

// ========================================================================
// Key parsing
// ========================================================================

#[test]
fn test_parse_deletion_keys() {
    assert_eq!(
        parse_key_string("Backspace").unwrap(),
        Keystroke::key(KeyCode::Backspace)
    );
    assert_eq!(
        parse_key_string("Ctrl+H").unwrap(),
        Keystroke::char_with_mods('h', Modifiers::CTRL)
    );
    assert!(parse_key_string("Hyper+Q").is_err());
}

#[test]
fn test_deletion_keys_round_trip_through_json() {
    let settings = Settings::from_value(json!({ "deletionKeys": ["Delete", "Alt+Backspace"] }));
    assert_eq!(settings.deletion_keys.len(), 2);
    assert_eq!(
        settings.to_value()["deletionKeys"],
        json!(["Delete", "Alt+Backspace"])
    );
}

// ========================================================================
// Stores
// ========================================================================

#[test]
fn test_first_load_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mathveil").join("settings.json");

    let markers = MathMarkers::load(Box::new(JsonFileStore::new(&path))).unwrap();
    assert_eq!(markers.settings(), &Settings::default());

    let stored = JsonFileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(stored["disableInTables"], json!(true));
    assert_eq!(stored["deletionKeys"], json!(["Backspace", "Ctrl+H"]));
}

#[test]
fn test_older_file_gains_new_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{ "disableDecorations": true }"#).unwrap();

    let markers = MathMarkers::load(Box::new(JsonFileStore::new(&path))).unwrap();
    assert!(markers.settings().disable_decorations);
    assert!(markers.settings().disable_in_code_blocks);

    let stored = JsonFileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(stored["disableDecorations"], json!(true));
    assert_eq!(stored["disableAtomicRanges"], json!(false));
}

#[test]
fn test_corrupt_file_is_replaced_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let markers = MathMarkers::load(Box::new(JsonFileStore::new(&path))).unwrap();
    assert_eq!(markers.settings(), &Settings::default());
    assert!(JsonFileStore::new(&path).load().unwrap().is_some());
}

#[test]
fn test_every_mutation_is_saved() {
    let store = MemoryStore::new();
    let mut markers = MathMarkers::load(Box::new(store.clone())).unwrap();
    assert_eq!(store.saves(), 1);

    markers
        .update_settings(|settings| settings.disable_in_tables = false)
        .unwrap();
    assert_eq!(store.value().unwrap()["disableInTables"], json!(false));

    let key = Keystroke::key(KeyCode::Delete);
    assert!(markers.add_deletion_key(key).unwrap());
    assert!(markers.remove_deletion_key(&key).unwrap());
    markers.reset_settings().unwrap();
    assert_eq!(store.saves(), 5);
    assert_eq!(store.value().unwrap(), Settings::default().to_value());
}

#[test]
fn test_set_field_by_json_key() {
    let mut settings = Settings::default();
    settings.set_field("disableAtomicRanges", "true").unwrap();
    assert!(settings.disable_atomic_ranges);
    assert!(settings.set_field("deletionKeys", r#"["Nope+X"]"#).is_err());
    assert!(!settings.deletion_keys.is_empty());
}
