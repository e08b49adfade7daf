//! Export Errors

use crate::transport::TransportError;
use std::io;

/// Errors produced while creating an exporter or exporting view data
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("expecting only one exporter per instance")]
    SingletonViolation,

    #[error("failed to initialize transport for {endpoint}: {source}")]
    TransportInit {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    #[error("aggregation {kind} is not supported (view {view})")]
    UnsupportedAggregation { view: String, kind: String },

    #[error("failed to submit {metric}: {source}")]
    Submit {
        metric: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to flush buffered points: {0}")]
    Flush(#[source] TransportError),
}

/// Outcome of exporting one snapshot
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Rows handed to the submitter
    pub rows: usize,
    /// Points accepted by the transport
    pub points: usize,
    pub errors: Vec<ExportError>,
}

impl ExportReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
