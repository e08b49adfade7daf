//! Configuration Types

use crate::exporter::ExportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:8125";

/// Largest payload that fits a single Ethernet frame once IP/UDP headers are removed
pub const DEFAULT_MAX_PACKET_SIZE: usize = 1432;

/// Largest possible UDP payload
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Callback invoked for every export error
pub type ErrorHandler = Arc<dyn Fn(&ExportError) + Send + Sync>;

/// How row tags are rendered on submitted points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFormat {
    /// `key:value` for every row tag
    #[default]
    KeyValue,
    /// Bare key names plus only the last base tag. Reproduces the historic
    /// output for side-by-side comparison and drops tag values.
    LegacyKeysOnly,
}

/// Exporter options
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Options {
    /// Prepended to every metric name
    pub namespace: String,
    /// DogStatsD address
    pub endpoint: String,
    /// Global tags added to every point
    pub tags: Vec<String>,
    pub tag_format: TagFormat,
    pub sanitize_names: bool,
    pub max_packet_size: usize,
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,
    /// Errors are logged when unset
    #[serde(skip)]
    pub on_error: Option<ErrorHandler>,
}

impl Options {
    /// Endpoint with the default substituted for an empty value
    pub fn endpoint_or_default(&self) -> &str {
        if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            &self.endpoint
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tag_format(mut self, tag_format: TagFormat) -> Self {
        self.tag_format = tag_format;
        self
    }

    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ExportError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Route an error to the configured handler or the log
    pub fn report_error(&self, err: &ExportError) {
        match &self.on_error {
            Some(handler) => handler(err),
            None => tracing::error!(error = %err, "Failed to export to Datadog"),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tags: Vec::new(),
            tag_format: TagFormat::default(),
            sanitize_names: false,
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            flush_interval: Duration::from_millis(100),
            on_error: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("namespace", &self.namespace)
            .field("endpoint", &self.endpoint)
            .field("tags", &self.tags)
            .field("tag_format", &self.tag_format)
            .field("sanitize_names", &self.sanitize_names)
            .field("max_packet_size", &self.max_packet_size)
            .field("flush_interval", &self.flush_interval)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
