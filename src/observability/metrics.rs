//! Metrics collection and exposition.
//!
//! # Metrics
//! - `authgate_requests_total` (counter): requests by outcome
//!   (bypass, allowed, denied, error)
//! - `authgate_auth_duration_seconds` (histogram): authorization round-trip
//! - `authgate_active_connections` (gauge): current client connections
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("authgate_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_auth_latency(start: Instant) {
    metrics::histogram!("authgate_auth_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn connection_opened() {
    metrics::gauge!("authgate_active_connections").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("authgate_active_connections").decrement(1.0);
}
