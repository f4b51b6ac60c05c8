use crate::error::{MissLogError, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Template used when the stored record has no template at all.
///
/// An explicitly empty template is different: it selects the fallback layout.
pub const DEFAULT_TEMPLATE: &str = "%datetime% [error]: open() \"%path%\" failed (2: No such file or directory), client: %client%, server: %server%, request: \"%request%\", host: \"%host%\", referrer: \"%referrer%\"";

/// strftime equivalent of `YYYY/MM/DD HH:mm:ss`.
pub const DEFAULT_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// How a rendered message reaches its destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Open the target file for append, write once, close.
    #[default]
    AppendFile,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::AppendFile => "append-file",
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated logger settings snapshot.
///
/// Handed to the writer by reference for each not-found event; nothing in
/// the write path mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub enabled: bool,
    pub file_path: String,
    pub template: String,
    pub date_format: String,
    pub write_mode: WriteMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            enabled: false,
            file_path: String::new(),
            template: DEFAULT_TEMPLATE.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            write_mode: WriteMode::AppendFile,
        }
    }
}

impl Configuration {
    /// Enabled and pointing at a file.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.file_path.is_empty()
    }

    /// `false` means the fallback layout is used.
    pub fn has_template(&self) -> bool {
        !self.template.is_empty()
    }
}

/// Boolean-ish value as it may appear in a stored record or a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Flag {
    /// Integer semantics for numeric text (`"1"`, `"0"`), plus the usual
    /// checkbox words.
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(n) => *n != 0,
            Flag::Text(s) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<i64>() {
                    return n != 0;
                }
                matches!(
                    s.to_ascii_lowercase().as_str(),
                    "true" | "on" | "yes"
                )
            }
        }
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Flag::Bool(b)
    }
}

/// The persisted record, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_mode: Option<WriteMode>,
}

/// Outcome of the defaulting step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub config: Configuration,
    /// At least one field was missing and took its default.
    pub filled_defaults: bool,
}

impl RawConfiguration {
    /// Fill every missing field with its default.
    pub fn resolve(self) -> Resolved {
        let defaults = Configuration::default();
        let filled_defaults = self.enabled.is_none()
            || self.file_path.is_none()
            || self.template.is_none()
            || self.date_format.is_none()
            || self.write_mode.is_none();

        let config = Configuration {
            enabled: self.enabled.map(|f| f.is_set()).unwrap_or(defaults.enabled),
            file_path: self.file_path.unwrap_or(defaults.file_path),
            template: self.template.unwrap_or(defaults.template),
            date_format: self.date_format.unwrap_or(defaults.date_format),
            write_mode: self.write_mode.unwrap_or(defaults.write_mode),
        };

        Resolved {
            config,
            filled_defaults,
        }
    }
}

impl From<&Configuration> for RawConfiguration {
    fn from(config: &Configuration) -> Self {
        Self {
            enabled: Some(Flag::Bool(config.enabled)),
            file_path: Some(config.file_path.clone()),
            template: Some(config.template.clone()),
            date_format: Some(config.date_format.clone()),
            write_mode: Some(config.write_mode),
        }
    }
}

/// Check a strftime format string without formatting anything.
pub fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(MissLogError::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}
