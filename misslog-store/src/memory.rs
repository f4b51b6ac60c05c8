use crate::SettingsStore;
use dashmap::DashMap;
use misslog_core::error::Result;
use misslog_core::settings::RawConfiguration;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// In-memory settings store.
///
/// Records are kept as JSON values, the same shape the file store persists,
/// so partial or legacy records can be seeded for tests.
#[derive(Clone)]
pub struct MemorySettingsStore {
    key: String,
    records: Arc<DashMap<String, Value>>,
}

impl MemorySettingsStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            records: Arc::new(DashMap::new()),
        }
    }

    /// Seed a raw record under any identifier.
    pub fn insert_raw(&self, key: impl Into<String>, value: Value) {
        self.records.insert(key.into(), value);
    }

    /// Raw record stored under this store's identifier.
    pub fn raw(&self) -> Option<Value> {
        self.records.get(&self.key).map(|r| r.value().clone())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn key(&self) -> &str {
        &self.key
    }

    fn read_record(&self) -> Result<Option<RawConfiguration>> {
        match self.raw() {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    fn write_record(&self, record: &RawConfiguration) -> Result<()> {
        self.records
            .insert(self.key.clone(), serde_json::to_value(record)?);
        debug!(key = %self.key, "Settings saved");
        Ok(())
    }
}
