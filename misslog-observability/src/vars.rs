use chrono::{DateTime, Local};
use misslog_core::RequestContext;
use misslog_core::settings::{DEFAULT_DATE_FORMAT, validate_date_format};
use std::fmt::Write;
use tracing::warn;

/// The closed set of template variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Datetime,
    Path,
    Client,
    Server,
    Request,
    Host,
    Referrer,
}

impl Placeholder {
    pub fn all() -> &'static [Placeholder] {
        &[
            Placeholder::Datetime,
            Placeholder::Path,
            Placeholder::Client,
            Placeholder::Server,
            Placeholder::Request,
            Placeholder::Host,
            Placeholder::Referrer,
        ]
    }

    /// Name without delimiters.
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Datetime => "datetime",
            Placeholder::Path => "path",
            Placeholder::Client => "client",
            Placeholder::Server => "server",
            Placeholder::Request => "request",
            Placeholder::Host => "host",
            Placeholder::Referrer => "referrer",
        }
    }

    /// Name as written in a template.
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Datetime => "%datetime%",
            Placeholder::Path => "%path%",
            Placeholder::Client => "%client%",
            Placeholder::Server => "%server%",
            Placeholder::Request => "%request%",
            Placeholder::Host => "%host%",
            Placeholder::Referrer => "%referrer%",
        }
    }

    /// Help text shown to operators editing a template.
    pub fn description(&self) -> &'static str {
        match self {
            Placeholder::Datetime => "Date and time of the error",
            Placeholder::Path => "Full path to the link with error",
            Placeholder::Client => "The IP address from which the user is getting the error",
            Placeholder::Server => "The name of the server host with error",
            Placeholder::Request => "Request method, Request URI and the information protocol",
            Placeholder::Host => "Host: header from the current request",
            Placeholder::Referrer => {
                "The address of the page (if any) which referred the user agent to the current link"
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Placeholder::all().iter().copied().find(|p| p.name() == name)
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Rendered value for every placeholder of one not-found event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableMap {
    pub datetime: String,
    pub path: String,
    pub client: String,
    pub server: String,
    pub request: String,
    pub host: String,
    /// Empty when the client sent no `Referer`.
    pub referrer: String,
}

impl VariableMap {
    pub fn build(ctx: &RequestContext, date_format: &str) -> Self {
        Self {
            datetime: format_datetime(&ctx.timestamp, date_format),
            path: ctx.full_path(),
            client: ctx.remote_addr.clone(),
            server: ctx.server_name.clone(),
            request: ctx.request_line(),
            host: ctx.host.clone(),
            referrer: ctx.referrer().unwrap_or_default().to_string(),
        }
    }

    pub fn get(&self, placeholder: Placeholder) -> &str {
        match placeholder {
            Placeholder::Datetime => &self.datetime,
            Placeholder::Path => &self.path,
            Placeholder::Client => &self.client,
            Placeholder::Server => &self.server,
            Placeholder::Request => &self.request,
            Placeholder::Host => &self.host,
            Placeholder::Referrer => &self.referrer,
        }
    }
}

/// Format with a strftime string, falling back to the default format when
/// the configured one cannot be used.
pub fn format_datetime(timestamp: &DateTime<Local>, date_format: &str) -> String {
    if validate_date_format(date_format).is_ok() {
        let mut out = String::new();
        if write!(out, "{}", timestamp.format(date_format)).is_ok() {
            return out;
        }
    }
    warn!(date_format, "Unusable date format, falling back to default");
    timestamp.format(DEFAULT_DATE_FORMAT).to_string()
}
