//! Datadog exporter for aggregated stats views
//! 
//! Converts periodically produced view data snapshots (counts, sums, last
//! values and distributions) into DogStatsD gauge points.
//!
//! ```no_run
//! use ocdatadog::{Exporter, Options};
//!
//! let exporter = Exporter::create(Options::default().with_namespace("myapp"))?;
//! # Ok::<(), ocdatadog::ExportError>(())
//! ```

pub mod config;
pub mod exporter;
pub mod transport;
pub mod view;

pub use config::{ConfigManager, Options, TagFormat};
pub use exporter::{Collector, ExportError, ExportReport, Exporter};
pub use transport::{MetricClient, StatsdClient, TransportError};
pub use view::{Aggregation, AggregationData, DistributionData, Row, Tag, View, ViewData};

/// Common error type for configuration handling
pub type Result<T> = anyhow::Result<T>;
