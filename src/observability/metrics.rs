//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_router_decisions_total` (counter): routing decisions by outcome
//! - `edge_router_request_duration_seconds` (histogram): serve-mode latency
//!   by outcome and status

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one routing decision.
pub fn record_decision(outcome: &'static str) {
    ::metrics::counter!("edge_router_decisions_total", "outcome" => outcome).increment(1);
}

/// Record a completed HTTP request.
pub fn record_request(status: u16, outcome: &'static str, start_time: Instant) {
    ::metrics::histogram!(
        "edge_router_request_duration_seconds",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}
