//! Metric Client Trait

use std::io;
use std::sync::Arc;

/// Errors raised while encoding or sending a point
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid metric name: {0:?}")]
    InvalidName(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: f64 },
}

/// Sink for gauge-shaped points.
///
/// Implementations must be safe to call from many threads at once; the
/// exporter shares one client across every concurrent export.
pub trait MetricClient: Send + Sync {
    /// Submit one gauge point
    fn gauge(
        &self,
        name: &str,
        value: f64,
        tags: &[String],
        rate: f64,
    ) -> Result<(), TransportError>;

    /// Push out anything buffered
    fn flush(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<C: MetricClient + ?Sized> MetricClient for Arc<C> {
    fn gauge(
        &self,
        name: &str,
        value: f64,
        tags: &[String],
        rate: f64,
    ) -> Result<(), TransportError> {
        (**self).gauge(name, value, tags, rate)
    }

    fn flush(&self) -> Result<(), TransportError> {
        (**self).flush()
    }
}
