pub mod fallback;
pub mod template;
pub mod vars;
pub mod writer;

pub use template::render;
pub use vars::{Placeholder, VariableMap};
pub use writer::{append_message, log_if_not_found, render_message};
