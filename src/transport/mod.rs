//! Transport Module
//! 
//! Clients that put gauge points on the wire.

pub mod client;
pub mod statsd;

pub use client::{MetricClient, TransportError};
pub use statsd::StatsdClient;
