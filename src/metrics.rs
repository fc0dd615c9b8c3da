use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder,
};
use std::time::Instant;

lazy_static! {
    // Fetch metrics
    pub static ref FETCH_REQUESTS: IntCounter = register_int_counter!(
        "nas_fetch_requests_total",
        "Total number of metric statistics requests issued"
    ).unwrap();

    pub static ref FETCH_FAILURES: IntCounterVec = register_int_counter_vec!(
        "nas_fetch_failures_total",
        "Total number of metrics dropped from a polling cycle",
        &["reason"]
    ).unwrap();

    pub static ref FETCH_DURATION: Histogram = register_histogram!(
        "nas_fetch_duration_seconds",
        "Time spent fetching and reducing one metric",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // Cycle metrics
    pub static ref CYCLE_DURATION: Histogram = register_histogram!(
        "nas_cycle_duration_seconds",
        "Time spent on one polling cycle",
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    pub static ref CYCLE_REPORTED: IntGauge = register_int_gauge!(
        "nas_cycle_reported_metrics",
        "Number of metrics reported by the last polling cycle"
    ).unwrap();
}

/// Counts one request and records its duration when dropped.
pub struct FetchTimer {
    start: Instant,
}

impl FetchTimer {
    pub fn new() -> Self {
        FETCH_REQUESTS.inc();
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for FetchTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FetchTimer {
    fn drop(&mut self) {
        FETCH_DURATION.observe(self.start.elapsed().as_secs_f64());
    }
}

pub fn record_failure(reason: &str) {
    FETCH_FAILURES.with_label_values(&[reason]).inc();
}

pub fn record_cycle(duration: f64, reported: usize) {
    CYCLE_DURATION.observe(duration);
    CYCLE_REPORTED.set(reported as i64);
}

/// Text exposition of every registered collector.
pub fn render() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
        return format!("# failed to encode metrics: {}\n", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
