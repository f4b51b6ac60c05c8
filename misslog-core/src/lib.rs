pub mod config;
pub mod context;
pub mod error;
pub mod sanitize;
pub mod settings;

pub use config::MissLogConfig;
pub use context::RequestContext;
pub use error::MissLogError;
pub use settings::{Configuration, RawConfiguration, WriteMode};
