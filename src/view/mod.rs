//! View Module
//! 
//! Aggregated view data as produced by the upstream stats engine.

pub mod types;

pub use types::{
    Aggregation, AggregationData, AggregationKind, DistributionData, Row, Tag, View, ViewData,
};
