//! Metrics collection and exposition.
//!
//! # Metrics
//! - `skip_requests_total` (counter): requests by method, status
//! - `skip_request_duration_seconds` (histogram): end-to-end latency
//! - `skip_transport_errors_total` (counter): delegation failures
//! - `skip_body_rewrites_total` (counter): HTML bodies rewritten
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "skip_requests_total",
        "method" => method.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "skip_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_transport_error() {
    metrics::counter!("skip_transport_errors_total").increment(1);
}

pub fn record_body_rewrite() {
    metrics::counter!("skip_body_rewrites_total").increment(1);
}
