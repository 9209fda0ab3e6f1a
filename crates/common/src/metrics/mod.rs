//! Metrics and timing utilities
//!
//! Prometheus-style metrics with standardized naming, plus the two timers
//! wrapped around every store interaction and every proxied request.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::{Duration, Instant};

/// Metrics prefix for all Pandamonium metrics
pub const METRICS_PREFIX: &str = "pandamonium";

/// Histogram buckets for request and query latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    describe_histogram!(
        format!("{}_db_query_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Record store interaction latency in seconds"
    );

    describe_histogram!(
        format!("{}_proxy_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Latency of requests forwarded to the persistence API"
    );

    describe_counter!(
        format!("{}_proxy_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Forwarded requests that produced no result"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Count a forwarded request that came back empty
pub fn record_proxy_failure(resource: &'static str, operation: &'static str) {
    counter!(
        format!("{}_proxy_failures_total", METRICS_PREFIX),
        "resource" => resource,
        "operation" => operation
    )
    .increment(1);
}

/// Measures one record store interaction.
///
/// Call [`QueryTimer::stop`] once the store returns; the elapsed time is
/// logged at debug level and recorded in the query histogram.
pub struct QueryTimer {
    start: Instant,
    resource: &'static str,
    operation: &'static str,
}

impl QueryTimer {
    pub fn start(resource: &'static str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            resource,
            operation,
        }
    }

    pub fn stop(self) -> Duration {
        let elapsed = self.start.elapsed();

        tracing::debug!(
            resource = self.resource,
            operation = self.operation,
            elapsed_ms = elapsed.as_millis() as u64,
            "Received response from store: query took {}ms to complete",
            elapsed.as_millis()
        );

        histogram!(
            format!("{}_db_query_duration_seconds", METRICS_PREFIX),
            "resource" => self.resource,
            "operation" => self.operation
        )
        .record(elapsed.as_secs_f64());

        elapsed
    }
}

/// Drop guard around a forwarded request.
///
/// The measurement is emitted when the guard goes out of scope, so every
/// exit path of the enclosing function reports its duration.
pub struct RequestTimer {
    start: Instant,
    resource: &'static str,
    operation: &'static str,
}

impl RequestTimer {
    pub fn start(resource: &'static str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            resource,
            operation,
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();

        tracing::info!(
            resource = self.resource,
            operation = self.operation,
            elapsed_ms = elapsed.as_millis() as u64,
            "{} {} request took {}ms",
            self.operation,
            self.resource,
            elapsed.as_millis()
        );

        histogram!(
            format!("{}_proxy_request_duration_seconds", METRICS_PREFIX),
            "resource" => self.resource,
            "operation" => self.operation
        )
        .record(elapsed.as_secs_f64());
    }
}
