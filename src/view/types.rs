//! View Types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// A single dimension assignment on a row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Aggregation declared by a view
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aggregation {
    Count,
    Sum,
    LastValue,
    Distribution { bounds: Vec<f64> },
}

impl Aggregation {
    pub fn kind(&self) -> AggregationKind {
        match self {
            Aggregation::Count => AggregationKind::Count,
            Aggregation::Sum => AggregationKind::Sum,
            Aggregation::LastValue => AggregationKind::LastValue,
            Aggregation::Distribution { .. } => AggregationKind::Distribution,
        }
    }
}

/// Discriminant of an aggregation, used in logs and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    Count,
    Sum,
    LastValue,
    Distribution,
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationKind::Count => "count",
            AggregationKind::Sum => "sum",
            AggregationKind::LastValue => "last_value",
            AggregationKind::Distribution => "distribution",
        };
        f.write_str(name)
    }
}

/// Named aggregation definition, partitioned by `tag_keys`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct View {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tag_keys: Vec<String>,
    pub aggregation: Aggregation,
}

impl View {
    pub fn new(name: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tag_keys: Vec::new(),
            aggregation,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tag_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

/// Histogram summary carried by a distribution row
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct DistributionData {
    pub count: i64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub sum_of_squared_dev: f64,
    /// Bucket counts, indexed by bucket number
    #[serde(default)]
    pub count_per_bucket: Vec<i64>,
}

/// Aggregated payload of a row
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AggregationData {
    Count { value: i64 },
    Sum { value: f64 },
    LastValue { value: f64 },
    Distribution(DistributionData),
    /// A payload kind with no known mapping
    Other { name: String },
}

impl AggregationData {
    /// Name of the payload kind as reported in errors
    pub fn kind_name(&self) -> &str {
        match self {
            AggregationData::Count { .. } => "count",
            AggregationData::Sum { .. } => "sum",
            AggregationData::LastValue { .. } => "last_value",
            AggregationData::Distribution(_) => "distribution",
            AggregationData::Other { name } => name,
        }
    }
}

/// One tag partition of a snapshot
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Row {
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub data: AggregationData,
}

impl Row {
    pub fn new(tags: Vec<Tag>, data: AggregationData) -> Self {
        Self { tags, data }
    }
}

/// Snapshot of a view at export time
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewData {
    pub view: Arc<View>,
    pub start: SystemTime,
    pub end: SystemTime,
    pub rows: Vec<Row>,
}

impl ViewData {
    pub fn new(view: Arc<View>, rows: Vec<Row>) -> Self {
        let now = SystemTime::now();
        Self {
            view,
            start: now,
            end: now,
            rows,
        }
    }
}
