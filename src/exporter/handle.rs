//! Exporter
//!
//! Process-wide entry point that owns the transport client and hands
//! non-empty snapshots to the collector.

use super::{Collector, ExportError, ExportReport};
use crate::config::Options;
use crate::transport::{MetricClient, StatsdClient, TransportError};
use crate::view::{View, ViewData};
use anyhow::Context;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Set by the first creation attempt and never cleared
static EXPORTER_CREATED: AtomicBool = AtomicBool::new(false);

fn claim_singleton() -> Result<(), ExportError> {
    if EXPORTER_CREATED.swap(true, Ordering::SeqCst) {
        return Err(ExportError::SingletonViolation);
    }
    Ok(())
}

/// Exports view data to DogStatsD
pub struct Exporter<C: MetricClient + 'static = StatsdClient> {
    options: Options,
    collector: Collector,
    client: Arc<C>,
    flush_handle: Option<JoinHandle<()>>,
}

impl Exporter<StatsdClient> {
    /// Create the process's exporter with a UDP DogStatsD client.
    ///
    /// Only the first creation attempt in a process can succeed. Every
    /// later attempt fails with [`ExportError::SingletonViolation`], even
    /// when the first one failed to set up its transport.
    pub fn create(options: Options) -> Result<Self, ExportError> {
        claim_singleton()?;

        let endpoint = options.endpoint_or_default().to_string();
        let client = StatsdClient::from_options(&options)
            .map_err(|source| ExportError::TransportInit { endpoint, source })?;

        info!(
            endpoint = %client.endpoint(),
            namespace = %options.namespace,
            "Created Datadog exporter"
        );
        Ok(Self::from_parts(options, client))
    }
}

impl<C: MetricClient + 'static> Exporter<C> {
    /// Create the process's exporter around an existing client. Shares the
    /// one-time gate with [`Exporter::create`].
    pub fn with_client(options: Options, client: C) -> Result<Self, ExportError> {
        claim_singleton()?;
        info!(namespace = %options.namespace, "Created Datadog exporter with custom client");
        Ok(Self::from_parts(options, client))
    }

    pub(crate) fn from_parts(options: Options, client: C) -> Self {
        let collector = Collector::new(&options);
        Self {
            options,
            collector,
            client: Arc::new(client),
            flush_handle: None,
        }
    }

    /// Export one snapshot. Snapshots without rows are ignored.
    ///
    /// Every error in the returned report has already been passed to the
    /// configured error handler.
    pub fn export(&self, snapshot: Arc<ViewData>) -> ExportReport {
        if snapshot.rows.is_empty() {
            return ExportReport::default();
        }

        let report = self.collector.add_snapshot(snapshot, self.client.as_ref());
        for err in &report.errors {
            self.options.report_error(err);
        }
        report
    }

    /// Register views ahead of their first snapshot
    pub fn register_views<'a, I>(&self, views: I)
    where
        I: IntoIterator<Item = &'a View>,
    {
        self.collector.register_views(views);
    }

    /// Flush buffered points now
    pub fn flush(&self) -> Result<(), TransportError> {
        self.client.flush()
    }

    /// Start flushing the client every `flush_interval`. Requires a tokio runtime.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.flush_handle.is_some() {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .context("Periodic flushing requires a tokio runtime")?;

        let interval = self.options.flush_interval;
        let client = Arc::clone(&self.client);
        let options = self.options.clone();
        self.flush_handle = Some(runtime.spawn(flush_loop(client, options, interval)));

        info!(interval = ?interval, "Started periodic flush");
        Ok(())
    }

    /// Stop periodic flushing and flush once more
    pub fn stop(&mut self) {
        if let Some(handle) = self.flush_handle.take() {
            handle.abort();
            info!("Stopped periodic flush");
        }
        if let Err(e) = self.client.flush() {
            self.options.report_error(&ExportError::Flush(e));
        }
    }

    pub fn is_running(&self) -> bool {
        self.flush_handle.is_some()
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl<C: MetricClient + 'static> Drop for Exporter<C> {
    fn drop(&mut self) {
        if let Some(handle) = self.flush_handle.take() {
            handle.abort();
        }
    }
}

async fn flush_loop<C: MetricClient>(client: Arc<C>, options: Options, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if let Err(e) = client.flush() {
            debug!(error = %e, "Periodic flush failed");
            options.report_error(&ExportError::Flush(e));
        }
    }
}
