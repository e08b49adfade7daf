//! Exporter Module
//! 
//! Turns view data snapshots into gauge submissions.

pub mod collector;
pub mod error;
pub mod handle;
pub mod naming;
pub mod submitter;
pub mod tags;

pub use collector::Collector;
pub use error::{ExportError, ExportReport};
pub use handle::Exporter;
pub use naming::{sanitize_name, view_name, view_signature};
pub use submitter::{submit_row, SubmitOutcome, SOURCE_TAG};
pub use tags::merge_tags;
