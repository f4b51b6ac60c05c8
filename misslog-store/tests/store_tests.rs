use misslog_core::error::MissLogError;
use misslog_core::sanitize::SettingsForm;
use misslog_core::settings::{DEFAULT_DATE_FORMAT, DEFAULT_TEMPLATE, Flag};
use misslog_core::Configuration;
use misslog_store::{FileSettingsStore, MemorySettingsStore, SettingsStore};
use serde_json::json;
use tempfile::tempdir;

// =============================================================================
// Defaulting on load
// =============================================================================

#[test]
fn test_partial_record_is_completed_and_written_back() {
    let store = MemorySettingsStore::new("miss_log_options");
    store.insert_raw(
        "miss_log_options",
        json!({"enabled": 1, "file_path": "/tmp/404.log"}),
    );

    let cfg = store.load().unwrap();
    assert!(cfg.enabled);
    assert_eq!(cfg.file_path, "/tmp/404.log");
    assert_eq!(cfg.template, DEFAULT_TEMPLATE);
    assert_eq!(cfg.date_format, DEFAULT_DATE_FORMAT);

    let raw = store.raw().unwrap();
    assert_eq!(raw["enabled"], true);
    assert_eq!(raw["template"], DEFAULT_TEMPLATE);
    assert_eq!(raw["date_format"], DEFAULT_DATE_FORMAT);
    assert_eq!(raw["write_mode"], "append-file");
}

#[test]
fn test_complete_record_is_not_rewritten() {
    let store = MemorySettingsStore::new("k");
    let record = json!({
        "enabled": "1",
        "file_path": "/tmp/404.log",
        "template": "",
        "date_format": "%H:%M",
        "write_mode": "append-file"
    });
    store.insert_raw("k", record.clone());

    let cfg = store.load().unwrap();
    assert!(cfg.enabled);
    assert!(!cfg.has_template());
    // Untouched: "1" stays a string because nothing was missing.
    assert_eq!(store.raw().unwrap(), record);
}

#[test]
fn test_invalid_record_is_an_error() {
    let store = MemorySettingsStore::new("k");
    store.insert_raw("k", json!({"file_path": 42}));
    assert!(matches!(store.load(), Err(MissLogError::Serde(_))));
}

// =============================================================================
// Settings surface round trip
// =============================================================================

#[test]
fn test_sanitized_form_is_persisted() {
    let dir = tempdir().unwrap();
    let store = FileSettingsStore::new(dir.path().join("settings.json"), "miss_log_options");

    let current = store.load().unwrap();
    let form = SettingsForm {
        enabled: Some(Flag::Text("on".into())),
        file_path: Some("  /var/log/<i>site</i>/404.log\n".into()),
        template: Some(String::new()),
        ..Default::default()
    };
    store.save(&form.apply(&current)).unwrap();

    let reloaded = FileSettingsStore::new(dir.path().join("settings.json"), "miss_log_options")
        .load()
        .unwrap();
    assert_eq!(
        reloaded,
        Configuration {
            enabled: true,
            file_path: "/var/log/site/404.log".into(),
            template: String::new(),
            ..Configuration::default()
        }
    );
}

#[test]
fn test_stores_are_usable_as_trait_objects() {
    let dir = tempdir().unwrap();
    let stores: Vec<Box<dyn SettingsStore>> = vec![
        Box::new(MemorySettingsStore::new("a")),
        Box::new(FileSettingsStore::new(dir.path().join("s.json"), "a")),
    ];
    for store in &stores {
        assert_eq!(store.key(), "a");
        assert_eq!(store.load().unwrap(), Configuration::default());
    }
}
