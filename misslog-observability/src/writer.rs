//! Write gate and append writer for not-found events.
//!
//! Each event is one open-append-close cycle on the configured file. There is
//! no buffering, no rotation and no locking: concurrent events rely on
//! `O_APPEND` to keep whole messages together.

use crate::fallback::format_fallback;
use crate::template::render;
use crate::vars::VariableMap;
use misslog_core::error::{MissLogError, Result};
use misslog_core::{Configuration, RequestContext, WriteMode};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

/// Render the message for one event, template or fallback layout.
pub fn render_message(config: &Configuration, ctx: &RequestContext) -> String {
    let vars = VariableMap::build(ctx, &config.date_format);
    if config.has_template() {
        render(&config.template, &vars)
    } else {
        format_fallback(&vars)
    }
}

/// Append `message` to `path`, creating the file if it does not exist.
///
/// Parent directories are never created.
pub fn append_message(path: &Path, message: &str) -> Result<()> {
    let write_err = |source: std::io::Error| MissLogError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(message.as_bytes()).map_err(write_err)?;
    Ok(())
}

/// Log the event if it is a not-found event and logging is configured.
///
/// Returns `true` only when a message was written. A failed write is
/// reported through `tracing` and never reaches the caller as an error.
pub fn log_if_not_found(not_found: bool, config: &Configuration, ctx: &RequestContext) -> bool {
    if !not_found || !config.enabled || config.file_path.is_empty() {
        return false;
    }

    let message = render_message(config, ctx);

    match config.write_mode {
        WriteMode::AppendFile => match append_message(Path::new(&config.file_path), &message) {
            Ok(()) => {
                debug!(
                    path = %config.file_path,
                    uri = %ctx.request_uri,
                    client = %ctx.remote_addr,
                    "Logged not-found request"
                );
                true
            }
            Err(e) => {
                warn!(error = %e, uri = %ctx.request_uri, "Failed to log not-found request");
                false
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn make_ctx() -> RequestContext {
        RequestContext::new("GET", "/missing", "HTTP/1.1")
            .with_document_root("/var/www")
            .with_remote_addr("10.0.0.5")
            .with_server_name("example.com")
            .with_host("example.com")
    }

    fn enabled_config(path: &Path) -> Configuration {
        Configuration {
            enabled: true,
            file_path: path.display().to_string(),
            template: String::new(),
            ..Configuration::default()
        }
    }

    #[test]
    fn writes_nothing_unless_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("404.log");
        assert!(!log_if_not_found(false, &enabled_config(&path), &make_ctx()));
        assert!(!path.exists());
    }

    #[test]
    fn writes_nothing_when_disabled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("404.log");
        let config = Configuration {
            enabled: false,
            ..enabled_config(&path)
        };
        assert!(!log_if_not_found(true, &config, &make_ctx()));
        assert!(!path.exists());
    }

    #[test]
    fn writes_nothing_with_empty_path() {
        let config = Configuration {
            enabled: true,
            file_path: String::new(),
            ..Configuration::default()
        };
        assert!(!log_if_not_found(true, &config, &make_ctx()));
    }

    #[test]
    fn creates_file_and_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("404.log");
        assert!(log_if_not_found(true, &enabled_config(&path), &make_ctx()));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('\n'));
        assert!(content.ends_with('\n'));
        assert!(content.contains("open() \"/var/www/missing\" failed"));
    }

    #[test]
    fn keeps_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("404.log");
        fs::write(&path, "earlier entry").unwrap();
        assert!(log_if_not_found(true, &enabled_config(&path), &make_ctx()));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier entry\n"));
    }

    #[test]
    fn missing_parent_directory_returns_false() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("404.log");
        assert!(!log_if_not_found(true, &enabled_config(&path), &make_ctx()));
        assert!(!path.exists());
    }

    #[test]
    fn append_message_reports_path_on_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("404.log");
        match append_message(&path, "x") {
            Err(MissLogError::Write { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected write error, got {other:?}"),
        }
    }

    #[test]
    fn render_message_picks_template_or_fallback() {
        let mut config = Configuration {
            template: "%client%".into(),
            ..Configuration::default()
        };
        assert_eq!(render_message(&config, &make_ctx()), "\n10.0.0.5\n");

        config.template.clear();
        assert!(render_message(&config, &make_ctx()).contains("client: 10.0.0.5"));
    }
}
