//! Tests for view registration and snapshot bookkeeping

mod common;

use common::RecordingClient;
use ocdatadog::exporter::view_signature;
use ocdatadog::{Aggregation, AggregationData, Collector, Options, Row, Tag, View, ViewData};
use std::sync::Arc;
use std::thread;

fn options() -> Options {
    Options::default().with_namespace("app")
}

fn count_view(name: &str, description: &str) -> View {
    View::new(name, Aggregation::Count)
        .with_tag_keys(["method"])
        .with_description(description)
}

fn count_row(method: &str, value: i64) -> Row {
    Row::new(vec![Tag::new("method", method)], AggregationData::Count { value })
}

#[test]
fn test_register_views_is_idempotent() {
    let collector = Collector::new(&options());
    let first = count_view("requests", "first");
    let second = count_view("requests", "second");

    collector.register_views([&first]);
    collector.register_views([&second, &first]);

    assert_eq!(collector.registered_count(), 1);
    let sig = view_signature("app", &first);
    assert_eq!(sig, "app.requests_method");
    assert_eq!(collector.registered_description(&sig).as_deref(), Some("first"));
}

#[test]
fn test_register_distinct_views() {
    let collector = Collector::new(&options());
    let a = count_view("requests", "");
    let b = View::new("requests", Aggregation::Count).with_tag_keys(["method", "status"]);
    let c = count_view("errors", "");

    collector.register_views([&a, &b, &c]);
    assert_eq!(collector.registered_count(), 3);
}

#[test]
fn test_add_snapshot_registers_and_submits() {
    let collector = Collector::new(&options());
    let client = RecordingClient::new();
    let view = Arc::new(count_view("requests", "desc"));
    let snapshot = Arc::new(ViewData::new(
        Arc::clone(&view),
        vec![count_row("GET", 3), count_row("POST", 5)],
    ));

    let report = collector.add_snapshot(snapshot, &client);

    assert!(report.is_ok());
    assert_eq!(report.rows, 2);
    assert_eq!(report.points, 2);
    assert_eq!(collector.registered_count(), 1);
    assert_eq!(
        collector.registered_description("app.requests_method").as_deref(),
        Some("desc")
    );

    let values: Vec<f64> = client.points().iter().map(|p| p.value).collect();
    assert_eq!(values, vec![3.0, 5.0]);
}

#[test]
fn test_last_snapshot_wins() {
    let collector = Collector::new(&options());
    let client = RecordingClient::new();
    let view = Arc::new(count_view("requests", ""));

    let first = Arc::new(ViewData::new(Arc::clone(&view), vec![count_row("GET", 1)]));
    let second = Arc::new(ViewData::new(Arc::clone(&view), vec![count_row("GET", 2)]));

    collector.add_snapshot(Arc::clone(&first), &client);
    collector.add_snapshot(Arc::clone(&second), &client);

    assert_eq!(collector.snapshot_count(), 1);
    let stored = collector.last_snapshot("app.requests_method").unwrap();
    assert!(Arc::ptr_eq(&stored, &second));
}

#[test]
fn test_row_errors_do_not_stop_siblings() {
    let collector = Collector::new(&options());
    let client = RecordingClient::new();
    let view = Arc::new(count_view("requests", ""));
    let snapshot = Arc::new(ViewData::new(
        view,
        vec![
            count_row("GET", 1),
            Row::new(Vec::new(), AggregationData::Other { name: "weird".to_string() }),
            count_row("POST", 2),
        ],
    ));

    let report = collector.add_snapshot(snapshot, &client);
    assert_eq!(report.rows, 3);
    assert_eq!(report.points, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(client.len(), 2);
}

#[test]
fn test_transport_failures_are_collected() {
    let collector = Collector::new(&options());
    let client = RecordingClient::failing(|_| true);
    let view = Arc::new(count_view("requests", ""));
    let snapshot = Arc::new(ViewData::new(
        view,
        vec![count_row("GET", 1), count_row("PUT", 2), count_row("POST", 3)],
    ));

    let report = collector.add_snapshot(snapshot, &client);
    assert_eq!(client.len(), 3);
    assert_eq!(report.points, 0);
    assert_eq!(report.errors.len(), 3);
}

#[test]
fn test_concurrent_snapshots_for_distinct_views() {
    const THREADS: usize = 32;

    let collector = Arc::new(Collector::new(&options()));
    let client = Arc::new(RecordingClient::new());

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let collector = Arc::clone(&collector);
            let client = Arc::clone(&client);
            thread::spawn(move || {
                let view = Arc::new(count_view(&format!("view_{}", i), ""));
                for round in 0..10 {
                    let snapshot = Arc::new(ViewData::new(
                        Arc::clone(&view),
                        vec![count_row("GET", round)],
                    ));
                    collector.add_snapshot(snapshot, client.as_ref());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(collector.registered_count(), THREADS);
    assert_eq!(collector.snapshot_count(), THREADS);
    assert_eq!(client.len(), THREADS * 10);

    for i in 0..THREADS {
        let sig = format!("app.view_{}_method", i);
        let stored = collector.last_snapshot(&sig).unwrap();
        assert_eq!(stored.rows[0].data, AggregationData::Count { value: 9 });
    }
}
