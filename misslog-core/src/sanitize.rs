//! Sanitizing for values submitted through the settings surface.
//!
//! Only two fields are touched on submit:
//!
//! | field         | treatment                                  |
//! |---------------|--------------------------------------------|
//! | `enabled`     | coerced to a boolean                       |
//! | `file_path`   | sanitized as plain text                    |
//! | `template`    | stored as submitted                        |
//! | `date_format` | stored as submitted                        |
//!
//! ```
//! use misslog_core::sanitize::sanitize_text_field;
//!
//! assert_eq!(sanitize_text_field("  /var/log/<b>404</b>.log\n"), "/var/log/404.log");
//! ```

use crate::settings::{Configuration, Flag, WriteMode};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static SCRIPT_STYLE_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*?>.*?</script>|<style[^>]*?>.*?</style>")
        .expect("script/style pattern compiles")
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern compiles"));

static PERCENT_OCTETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("octet pattern compiles"));

static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("whitespace pattern compiles"));

// ─────────────────────────────────────────────────────────────
// Plain-text sanitizing
// ─────────────────────────────────────────────────────────────

/// Reduce a submitted value to a single line of plain text.
///
/// Removes `<script>`/`<style>` blocks with their content, every remaining
/// markup tag, and percent-encoded octets; collapses line breaks, tabs and
/// runs of spaces into one space; trims both ends.
pub fn sanitize_text_field(value: &str) -> String {
    let without_blocks = SCRIPT_STYLE_BLOCKS.replace_all(value, "");
    let without_tags = TAGS.replace_all(&without_blocks, "");

    // Removing one octet can expose another (`%%4141`), so repeat until stable.
    let mut text = without_tags.into_owned();
    loop {
        let next = PERCENT_OCTETS.replace_all(&text, "").into_owned();
        if next == text {
            break;
        }
        text = next;
    }

    WHITESPACE_RUNS.replace_all(&text, " ").trim().to_string()
}

// ─────────────────────────────────────────────────────────────
// Form submission
// ─────────────────────────────────────────────────────────────

/// A settings submission. Absent fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub enabled: Option<Flag>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub date_format: Option<String>,
    #[serde(default)]
    pub write_mode: Option<WriteMode>,
}

impl SettingsForm {
    /// Sanitize the submission and merge it over `current`.
    pub fn apply(self, current: &Configuration) -> Configuration {
        let mut next = current.clone();
        if let Some(flag) = self.enabled {
            next.enabled = flag.is_set();
        }
        if let Some(path) = self.file_path {
            next.file_path = sanitize_text_field(&path);
        }
        if let Some(template) = self.template {
            next.template = template;
        }
        if let Some(date_format) = self.date_format {
            next.date_format = date_format;
        }
        if let Some(mode) = self.write_mode {
            next.write_mode = mode;
        }
        next
    }

    pub fn is_empty(&self) -> bool {
        self == &SettingsForm::default()
    }
}
