use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for misslog.
#[derive(Error, Debug)]
pub enum MissLogError {
    #[error("Write to {path} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MissLogError>;
