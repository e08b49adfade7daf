//! Shared test helpers

#![allow(dead_code)]

use ocdatadog::{MetricClient, TransportError};
use std::sync::Mutex;

/// One recorded gauge call
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub name: String,
    pub value: f64,
    pub tags: Vec<String>,
    pub rate: f64,
}

/// Client that records every gauge call, optionally failing some of them
#[derive(Default)]
pub struct RecordingClient {
    points: Mutex<Vec<Point>>,
    fail_when: Option<Box<dyn Fn(&str) -> bool + Send + Sync>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call whose metric name satisfies `pred`
    pub fn failing<F>(pred: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            points: Mutex::new(Vec::new()),
            fail_when: Some(Box::new(pred)),
        }
    }

    pub fn points(&self) -> Vec<Point> {
        self.points.lock().unwrap().clone()
    }

    pub fn named(&self, name: &str) -> Vec<Point> {
        self.points().into_iter().filter(|p| p.name == name).collect()
    }

    pub fn len(&self) -> usize {
        self.points.lock().unwrap().len()
    }
}

impl MetricClient for RecordingClient {
    fn gauge(
        &self,
        name: &str,
        value: f64,
        tags: &[String],
        rate: f64,
    ) -> Result<(), TransportError> {
        self.points.lock().unwrap().push(Point {
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
            rate,
        });

        match &self.fail_when {
            Some(pred) if pred(name) => Err(TransportError::InvalidName(name.to_string())),
            _ => Ok(()),
        }
    }
}
