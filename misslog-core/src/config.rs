use figment::{Figment, providers::{Env, Format, Yaml}};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level host configuration.
///
/// The logger's own settings (enabled flag, target file, template) are not
/// here: they live in the settings store so the settings surface can change
/// them without touching this file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissLogConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Static-file host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Directory served to clients; also the prefix of `%path%`.
    #[serde(default = "default_document_root")]
    pub document_root: String,
    /// Reported as `%server%`.
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

/// Where the logger settings record is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_path")]
    pub path: PathBuf,
    /// Identifier of the record inside the settings file.
    #[serde(default = "default_settings_key")]
    pub key: String,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_listen_addr() -> String { "0.0.0.0:8080".into() }
fn default_document_root() -> String { "public".into() }
fn default_server_name() -> String { "localhost".into() }
fn default_settings_path() -> PathBuf { PathBuf::from("data/misslog-settings.json") }
fn default_settings_key() -> String { "miss_log_options".into() }

// ── Impls ─────────────────────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            document_root: default_document_root(),
            server_name: default_server_name(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
            key: default_settings_key(),
        }
    }
}

impl MissLogConfig {
    /// Load configuration from YAML file + env overrides.
    ///
    /// Environment keys use `__` between sections, e.g.
    /// `MISSLOG_SERVER__DOCUMENT_ROOT=/var/www`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config: MissLogConfig = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("MISSLOG_").split("__"))
            .extract()?;
        Ok(config)
    }
}
