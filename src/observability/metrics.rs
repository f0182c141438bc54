//! Metrics collection and exposition.
//!
//! # Metrics
//! - `coinpayments_requests_total` (counter): API calls by cmd, outcome
//! - `coinpayments_request_duration_seconds` (histogram): round-trip latency by cmd
//! - `coinpayments_poll_cycles_total` (counter): poll cycles by outcome
//! - `coinpayments_tracked_transactions` (gauge): transactions awaiting a terminal status
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished API call.
pub fn record_request(cmd: &'static str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!("coinpayments_requests_total", "cmd" => cmd, "outcome" => outcome).increment(1);
    metrics::histogram!("coinpayments_request_duration_seconds", "cmd" => cmd)
        .record(elapsed.as_secs_f64());
}

/// Record a request rejected before reaching the network.
pub fn record_rejected(cmd: &'static str) {
    metrics::counter!("coinpayments_requests_total", "cmd" => cmd, "outcome" => "rejected").increment(1);
}

/// Record the outcome of one poll cycle.
pub fn record_poll_cycle(outcome: &'static str) {
    metrics::counter!("coinpayments_poll_cycles_total", "outcome" => outcome).increment(1);
}

pub fn record_tracked(count: usize) {
    metrics::gauge!("coinpayments_tracked_transactions").set(count as f64);
}
