//! Metrics collection and exposition.
//!
//! # Metrics
//! - `craft_requests_total` (counter): dispatched requests by method, status, space
//! - `craft_request_duration_seconds` (histogram): dispatch latency by space
//!
//! # Design Decisions
//! - Requests that match no route are labelled `space="none"`
//! - The Prometheus exporter serves its own listener, separate from the app

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RouteSpace;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished dispatch.
pub fn record_request(method: &str, status: u16, space: Option<RouteSpace>, started: Instant) {
    let space = space.map(|s| s.as_str()).unwrap_or("none");
    metrics::counter!(
        "craft_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "space" => space
    )
    .increment(1);
    metrics::histogram!("craft_request_duration_seconds", "space" => space)
        .record(started.elapsed().as_secs_f64());
}
