//! Metric Submitter
//!
//! Maps one aggregated row onto the gauge points that represent it. Holds
//! no state and takes no locks, so rows may be submitted in parallel.

use super::{merge_tags, sanitize_name, ExportError};
use crate::config::TagFormat;
use crate::transport::MetricClient;
use crate::view::{AggregationData, DistributionData, Row, View};
use std::borrow::Cow;
use tracing::warn;

/// Base tag attached to every point
pub const SOURCE_TAG: &str = "source:Opencensus";

const SAMPLE_RATE: f64 = 1.0;

/// Result of submitting a single row
#[derive(Debug, Default)]
pub struct SubmitOutcome {
    pub points: usize,
    pub errors: Vec<ExportError>,
}

impl SubmitOutcome {
    fn record<C: MetricClient + ?Sized>(
        &mut self,
        client: &C,
        name: &str,
        value: f64,
        tags: &[String],
    ) {
        match client.gauge(name, value, tags, SAMPLE_RATE) {
            Ok(()) => self.points += 1,
            Err(source) => self.errors.push(ExportError::Submit {
                metric: name.to_string(),
                source,
            }),
        }
    }
}

/// Submit the points for one row of `view`.
///
/// Count, sum and last value rows become a single gauge named after the
/// view. Distribution rows become five summary gauges plus one
/// `count_per_bucket` gauge per bucket. A failed point never stops the
/// remaining ones; every failure is returned in the outcome.
pub fn submit_row<C: MetricClient + ?Sized>(
    client: &C,
    view: &View,
    row: &Row,
    tag_format: TagFormat,
    sanitize: bool,
) -> SubmitOutcome {
    let name: Cow<'_, str> = if sanitize {
        sanitize_name(&view.name)
    } else {
        Cow::Borrowed(view.name.as_str())
    };
    let base_tags = [SOURCE_TAG.to_string()];
    let mut outcome = SubmitOutcome::default();

    match &row.data {
        AggregationData::Count { value } => {
            let tags = merge_tags(&row.tags, &base_tags, tag_format);
            outcome.record(client, &name, *value as f64, &tags);
        }
        AggregationData::Sum { value } | AggregationData::LastValue { value } => {
            let tags = merge_tags(&row.tags, &base_tags, tag_format);
            outcome.record(client, &name, *value, &tags);
        }
        AggregationData::Distribution(data) => {
            submit_distribution(client, &name, row, data, tag_format, &mut outcome);
        }
        AggregationData::Other { name: kind } => {
            warn!(view = %view.name, kind = %kind, "Skipping row with unsupported aggregation");
            outcome.errors.push(ExportError::UnsupportedAggregation {
                view: view.name.clone(),
                kind: kind.clone(),
            });
        }
    }

    outcome
}

fn submit_distribution<C: MetricClient + ?Sized>(
    client: &C,
    name: &str,
    row: &Row,
    data: &DistributionData,
    tag_format: TagFormat,
    outcome: &mut SubmitOutcome,
) {
    let tags = merge_tags(&row.tags, &[SOURCE_TAG.to_string()], tag_format);
    let summary = [
        ("min", data.min),
        ("max", data.max),
        ("count", data.count as f64),
        ("avg", data.mean),
        ("squared_dev_sum", data.sum_of_squared_dev),
    ];
    for (suffix, value) in summary {
        outcome.record(client, &format!("{}.{}", name, suffix), value, &tags);
    }

    let bucket_name = format!("{}.count_per_bucket", name);
    for (idx, count) in data.count_per_bucket.iter().enumerate() {
        let bucket_base = [SOURCE_TAG.to_string(), format!("bucket_idx{}", idx)];
        let tags = merge_tags(&row.tags, &bucket_base, tag_format);
        outcome.record(client, &bucket_name, *count as f64, &tags);
    }
}
