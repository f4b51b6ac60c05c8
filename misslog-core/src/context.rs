use chrono::{DateTime, Local};

/// Per-event snapshot of the request that missed.
///
/// Built fresh by the host for every not-found event and dropped once the
/// write returns.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub timestamp: DateTime<Local>,
    pub document_root: String,
    /// Request target as received, query string included.
    pub request_uri: String,
    pub remote_addr: String,
    pub server_name: String,
    pub request_method: String,
    pub server_protocol: String,
    /// Value of the `Host` header.
    pub host: String,
    /// Value of the `Referer` header, if the client sent one.
    pub referrer: Option<String>,
}

impl RequestContext {
    /// Context stamped with the current local time; remaining fields empty.
    pub fn new(method: impl Into<String>, uri: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            document_root: String::new(),
            request_uri: uri.into(),
            remote_addr: String::new(),
            server_name: String::new(),
            request_method: method.into(),
            server_protocol: protocol.into(),
            host: String::new(),
            referrer: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_document_root(mut self, root: impl Into<String>) -> Self {
        self.document_root = root.into();
        self
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = addr.into();
        self
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_referrer(mut self, referrer: Option<String>) -> Self {
        self.referrer = referrer;
        self
    }

    /// Referrer, treating an empty header the same as a missing one.
    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref().filter(|r| !r.is_empty())
    }

    /// Filesystem path the request would have resolved to.
    pub fn full_path(&self) -> String {
        format!("{}{}", self.document_root, self.request_uri)
    }

    /// Request line: `METHOD URI PROTOCOL`.
    pub fn request_line(&self) -> String {
        format!(
            "{} {} {}",
            self.request_method, self.request_uri, self.server_protocol
        )
    }
}
