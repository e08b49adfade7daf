//! View Data Collector

use super::{submit_row, view_signature, ExportReport};
use crate::config::{Options, TagFormat};
use crate::transport::MetricClient;
use crate::view::{View, ViewData};
use metrics::counter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// Tracks registered views and the latest snapshot of each, and fans
/// snapshot rows out to the submitter.
///
/// The registration map and the snapshot map sit behind separate locks so
/// neither blocks the other. Locks are never held while submitting.
#[derive(Debug)]
pub struct Collector {
    namespace: String,
    tag_format: TagFormat,
    sanitize_names: bool,
    // signature -> description from the first registration
    registered_views: RwLock<HashMap<String, String>>,
    // signature -> most recent snapshot
    view_data: Mutex<HashMap<String, Arc<ViewData>>>,
}

impl Collector {
    /// Create an empty collector
    pub fn new(options: &Options) -> Self {
        Self {
            namespace: options.namespace.clone(),
            tag_format: options.tag_format,
            sanitize_names: options.sanitize_names,
            registered_views: RwLock::new(HashMap::new()),
            view_data: Mutex::new(HashMap::new()),
        }
    }

    /// Register views not seen before. Already known signatures are left
    /// untouched, including their description.
    pub fn register_views<'a, I>(&self, views: I)
    where
        I: IntoIterator<Item = &'a View>,
    {
        for view in views {
            let sig = view_signature(&self.namespace, view);

            let known = self
                .registered_views
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&sig);
            if known {
                continue;
            }

            let mut registered = self
                .registered_views
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if !registered.contains_key(&sig) {
                debug!(
                    signature = %sig,
                    view = %view.name,
                    aggregation = %view.aggregation.kind(),
                    "Registered view"
                );
                registered.insert(sig, view.description.clone());
                counter!("ocdatadog.views_registered", 1);
            }
        }
    }

    /// Record `snapshot` as the latest for its view and submit every row.
    ///
    /// Rows are attempted independently; failures are collected in the
    /// returned report.
    pub fn add_snapshot<C: MetricClient + ?Sized>(
        &self,
        snapshot: Arc<ViewData>,
        client: &C,
    ) -> ExportReport {
        let view = Arc::clone(&snapshot.view);
        self.register_views([view.as_ref()]);
        let sig = view_signature(&self.namespace, &view);

        self.view_data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sig, Arc::clone(&snapshot));

        let mut report = ExportReport::default();
        for row in &snapshot.rows {
            let outcome = submit_row(client, &view, row, self.tag_format, self.sanitize_names);
            report.rows += 1;
            report.points += outcome.points;
            report.errors.extend(outcome.errors);
        }

        counter!("ocdatadog.snapshots_exported", 1);
        counter!("ocdatadog.points_submitted", report.points as u64);
        if !report.errors.is_empty() {
            counter!("ocdatadog.submit_errors", report.errors.len() as u64);
        }

        debug!(
            view = %view.name,
            rows = report.rows,
            points = report.points,
            errors = report.errors.len(),
            "Exported view data"
        );

        report
    }

    /// Description stored for `signature`
    pub fn registered_description(&self, signature: &str) -> Option<String> {
        self.registered_views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(signature)
            .cloned()
    }

    /// Number of registered signatures
    pub fn registered_count(&self) -> usize {
        self.registered_views
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Latest snapshot stored for `signature`
    pub fn last_snapshot(&self, signature: &str) -> Option<Arc<ViewData>> {
        self.view_data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(signature)
            .cloned()
    }

    /// Number of signatures with a stored snapshot
    pub fn snapshot_count(&self) -> usize {
        self.view_data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
