pub mod file;
pub mod memory;

pub use file::FileSettingsStore;
pub use memory::MemorySettingsStore;

use misslog_core::error::Result;
use misslog_core::settings::{RawConfiguration, Resolved};
use misslog_core::Configuration;
use tracing::{info, warn};

/// Persistence for the logger settings record.
///
/// Implementors only move raw records in and out; defaulting and write-back
/// are shared by every store through [`SettingsStore::load`].
pub trait SettingsStore: Send + Sync {
    /// Identifier the record is stored under.
    fn key(&self) -> &str;

    /// The stored record, or `None` if nothing has been saved yet.
    fn read_record(&self) -> Result<Option<RawConfiguration>>;

    /// Replace the stored record.
    fn write_record(&self, record: &RawConfiguration) -> Result<()>;

    /// Load the settings, filling in defaults for missing fields.
    ///
    /// When a default had to be filled in, the completed record is written
    /// back. A failed write-back is logged and does not fail the load.
    fn load(&self) -> Result<Configuration> {
        let raw = self.read_record()?.unwrap_or_default();
        let Resolved {
            config,
            filled_defaults,
        } = raw.resolve();

        if filled_defaults {
            match self.write_record(&RawConfiguration::from(&config)) {
                Ok(()) => info!(key = self.key(), "Stored default settings for missing fields"),
                Err(e) => warn!(key = self.key(), error = %e, "Failed to store default settings"),
            }
        }

        Ok(config)
    }

    /// Persist a complete configuration.
    fn save(&self, config: &Configuration) -> Result<()> {
        self.write_record(&RawConfiguration::from(config))
    }
}
