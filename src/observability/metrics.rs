//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rpc_requests_total` (counter): requests by method, status
//! - `rpc_request_duration_seconds` (histogram): dispatch latency by method
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Requests that never resolve a method are labelled `unresolved`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    metrics::counter!(
        "rpc_requests_total",
        "method" => method.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("rpc_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}
