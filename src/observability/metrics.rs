//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by method, status
//! - `gateway_request_duration_seconds` (histogram): proxy latency
//! - `gateway_upstream_errors_total` (counter): forwarding failures by kind
//! - `job_polls_total` (counter): job status observations by status

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("gateway_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record a forwarding failure.
pub fn record_upstream_error(kind: &'static str) {
    counter!("gateway_upstream_errors_total", "kind" => kind).increment(1);
}

/// Record one job status observation.
pub fn record_job_poll(status: &'static str) {
    counter!("job_polls_total", "status" => status).increment(1);
}
