//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ledger_rpc_requests_total` (counter): JSON-RPC calls by method, outcome
//! - `ledger_transactions_submitted_total` (counter): submissions by
//!   transaction type and engine result
//!
//! Recording is a no-op until a recorder is installed, so the demo run
//! pays nothing when metrics are disabled.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one JSON-RPC call.
pub fn record_rpc(method: &'static str, outcome: &'static str) {
    counter!("ledger_rpc_requests_total", "method" => method, "outcome" => outcome).increment(1);
}

/// Count one transaction submission.
pub fn record_submission(tx_type: &'static str, engine_result: &str) {
    counter!(
        "ledger_transactions_submitted_total",
        "tx_type" => tx_type,
        "engine_result" => engine_result.to_string()
    )
    .increment(1);
}
