//! JSON-file settings store.
//!
//! The file holds one JSON object whose keys are record identifiers, so
//! several sites can share a file:
//!
//! ```json
//! {
//!   "miss_log_options": {
//!     "enabled": true,
//!     "file_path": "/var/log/site/404.log",
//!     "template": "",
//!     "date_format": "%Y/%m/%d %H:%M:%S",
//!     "write_mode": "append-file"
//!   }
//! }
//! ```
//!
//! Writes go to a `.tmp` sibling first and are renamed over the final path,
//! so a crash mid-write never leaves a truncated file behind.

use crate::SettingsStore;
use misslog_core::error::{MissLogError, Result};
use misslog_core::settings::RawConfiguration;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::debug;

pub struct FileSettingsStore {
    path: PathBuf,
    key: String,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Whole document; an absent or blank file reads as empty.
    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No settings file found");
            return Ok(Map::new());
        }

        let data = std::fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            debug!(path = %self.path.display(), "Settings file is empty");
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            _ => Err(MissLogError::Store(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl SettingsStore for FileSettingsStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn read_record(&self) -> Result<Option<RawConfiguration>> {
        let mut document = self.read_document()?;
        match document.remove(&self.key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    fn write_record(&self, record: &RawConfiguration) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(self.key.clone(), serde_json::to_value(record)?);
        let json = serde_json::to_string_pretty(&Value::Object(document))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), key = %self.key, "Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use misslog_core::Configuration;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults_and_writes_them_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = FileSettingsStore::new(&path, "miss_log_options");

        let cfg = store.load().unwrap();
        assert_eq!(cfg, Configuration::default());

        let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["miss_log_options"]["enabled"], false);
        assert_eq!(stored["miss_log_options"]["write_mode"], "append-file");
    }

    #[test]
    fn save_then_load_returns_same_configuration() {
        let dir = tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("settings.json"), "k");
        let cfg = Configuration {
            enabled: true,
            file_path: "/tmp/404.log".into(),
            template: String::new(),
            ..Configuration::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
    }

    #[test]
    fn other_records_are_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"other_site": {"enabled": true}}"#).unwrap();

        let store = FileSettingsStore::new(&path, "miss_log_options");
        store.save(&Configuration::default()).unwrap();

        let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["other_site"]["enabled"], true);
        assert!(stored.get("miss_log_options").is_some());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json {{{{").unwrap();
        let store = FileSettingsStore::new(&path, "k");
        assert!(matches!(store.load(), Err(MissLogError::Serde(_))));
    }

    #[test]
    fn non_object_document_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let store = FileSettingsStore::new(&path, "k");
        assert!(matches!(store.read_record(), Err(MissLogError::Store(_))));
    }

    #[test]
    fn blank_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "  \n").unwrap();
        let store = FileSettingsStore::new(&path, "k");

        assert_eq!(store.load().unwrap(), Configuration::default());
        let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored["k"]["write_mode"], "append-file");
    }

    #[test]
    fn null_record_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"k": null}"#).unwrap();
        let store = FileSettingsStore::new(&path, "k");
        assert_eq!(store.load().unwrap(), Configuration::default());
    }

    #[test]
    fn null_document_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "null").unwrap();
        let store = FileSettingsStore::new(&path, "k");
        assert_eq!(store.load().unwrap(), Configuration::default());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        let store = FileSettingsStore::new(&path, "k");
        store.save(&Configuration::default()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
