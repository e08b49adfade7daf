//! Export Demo
//! 
//! Replays a JSON view data snapshot through the exporter and flushes it
//! to a local DogStatsD agent.

use ocdatadog::{ConfigManager, Exporter, ViewData};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

const SNAPSHOT: &str = r#"{
    "view": {
        "name": "http.server.latency",
        "description": "Server latency in milliseconds",
        "tag_keys": ["method"],
        "aggregation": { "type": "distribution", "bounds": [10.0, 50.0, 100.0] }
    },
    "start": { "secs_since_epoch": 1700000000, "nanos_since_epoch": 0 },
    "end": { "secs_since_epoch": 1700000060, "nanos_since_epoch": 0 },
    "rows": [
        {
            "tags": [{ "key": "method", "value": "GET" }],
            "data": {
                "type": "distribution",
                "count": 4, "min": 1.0, "max": 90.0, "mean": 30.0,
                "sum_of_squared_dev": 5000.0,
                "count_per_bucket": [2, 1, 1, 0]
            }
        },
        {
            "tags": [{ "key": "method", "value": "POST" }],
            "data": { "type": "other", "name": "exponential_histogram" }
        }
    ]
}"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let options = ConfigManager::load_from_env()?;
    let mut exporter = Exporter::create(options)?;
    exporter.start()?;

    let snapshot: ViewData = serde_json::from_str(SNAPSHOT)?;
    let report = exporter.export(Arc::new(snapshot));
    println!(
        "Exported {} rows as {} points ({} errors)",
        report.rows,
        report.points,
        report.errors.len()
    );

    sleep(Duration::from_millis(500)).await;
    exporter.stop();
    Ok(())
}
