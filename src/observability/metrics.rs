//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_gate_decisions_total` (counter): access decisions by outcome, reason
//! - `edge_gate_range_reloads_total` (counter): edge tables swapped in after start-up, by origin
//! - `edge_gate_range_prefixes` (gauge): prefixes in the live edge table
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus endpoint only when enabled in config

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(outcome: &'static str, reason: &'static str) {
    counter!("edge_gate_decisions_total", "outcome" => outcome, "reason" => reason).increment(1);
}

/// Size of the live edge table.
pub fn record_range_prefixes(prefixes: usize) {
    gauge!("edge_gate_range_prefixes").set(prefixes as f64);
}

/// A table swapped in after start-up.
pub fn record_range_reload(origin: &'static str, prefixes: usize) {
    counter!("edge_gate_range_reloads_total", "origin" => origin).increment(1);
    record_range_prefixes(prefixes);
}
