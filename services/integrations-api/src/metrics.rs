//! Prometheus metrics exposition
//!
//! - `hubspot_http_requests_total` (counter): labels `route`, `status`
//! - `hubspot_http_request_duration_seconds` (histogram): label `route`
//! - `hubspot_oauth_events_total` (counter): labels `stage`, `outcome`

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Process-local counters reported by `/health`.
#[derive(Clone)]
pub struct ServiceMetrics {
    pub requests_total: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: Arc::new(AtomicU64::new(0)),
            errors_total: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn builder() -> Result<PrometheusBuilder, BuildError> {
    PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("hubspot_http_request_duration_seconds".to_string()),
        DURATION_BUCKETS,
    )
}

/// Install the Prometheus recorder and return a handle for rendering metrics.
///
/// The duration metric gets explicit buckets so it renders as a histogram
/// (`_bucket` lines) rather than a summary. Buckets run from 5ms up to the
/// 30s default outbound timeout.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    builder()?.install_recorder()
}

/// Record a completed HTTP request.
pub fn record_request(route: &str, status: u16, duration_secs: f64) {
    metrics::counter!(
        "hubspot_http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("hubspot_http_request_duration_seconds", "route" => route.to_string())
        .record(duration_secs);
}

/// Record one step of the OAuth flow (`authorize`, `callback`, `credentials`, `load`).
pub fn record_oauth_event(stage: &'static str, outcome: &'static str) {
    metrics::counter!("hubspot_oauth_events_total", "stage" => stage, "outcome" => outcome)
        .increment(1);
}

/// Count the outcome of a flow step and pass the result through.
pub fn observe<T, E>(stage: &'static str, result: Result<T, E>) -> Result<T, E> {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    record_oauth_event(stage, outcome);
    result
}
