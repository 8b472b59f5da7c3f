//! Metrics collection and exposition.
//!
//! # Metrics
//! - `joymap_mapping_updates_total` (counter): update requests by outcome
//! - `joymap_driver_restarts_total` (counter): restart cycles by stop outcome
//! - `joymap_driver_launches_total` (counter): driver spawns by outcome
//! - `joymap_merge_skipped_entries_total` (counter): malformed patch entries
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_mapping_update(outcome: &'static str) {
    metrics::counter!("joymap_mapping_updates_total", "outcome" => outcome).increment(1);
}

pub fn record_driver_restart(outcome: &'static str) {
    metrics::counter!("joymap_driver_restarts_total", "outcome" => outcome).increment(1);
}

pub fn record_driver_launch(outcome: &'static str) {
    metrics::counter!("joymap_driver_launches_total", "outcome" => outcome).increment(1);
}

pub fn record_skipped_entries(count: usize) {
    if count > 0 {
        metrics::counter!("joymap_merge_skipped_entries_total").increment(count as u64);
    }
}
