//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, backend
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_openapi_rewrites_total` (counter): API docs handled by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder (tests, metrics disabled) every call is a no-op
//! - Prometheus exporter serves its own HTTP listener

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a proxied request.
pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    let backend = backend.to_string();
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.clone(),
        "status" => status.clone(),
        "backend" => backend.clone()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method,
        "status" => status,
        "backend" => backend
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of an API docs rewrite:
/// `rewritten`, `skipped`, `decompression_failed` or `error`.
pub fn record_openapi_rewrite(outcome: &'static str) {
    metrics::counter!("gateway_openapi_rewrites_total", "outcome" => outcome).increment(1);
}
