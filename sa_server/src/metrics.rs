//! Prometheus metrics for monitoring authentication health.
//!
//! Metrics are exposed in Prometheus text format at `http://<addr>/metrics`
//! when an exporter address is configured.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// # Arguments
///
/// - `addr`: Address to bind the metrics server to (e.g., `0.0.0.0:9090`)
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

/// Record a login attempt with its outcome
/// (`success`, `invalid_credentials`, `missing_fields`, or `error`).
pub fn login_attempts_total(outcome: &str) {
    metrics::counter!("login_attempts_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a session check (who-am-i) and whether the token validated.
pub fn session_checks_total(valid: bool) {
    metrics::counter!("session_checks_total",
        "valid" => valid.to_string()
    )
    .increment(1);
}

/// Record a session destroyed by logout.
pub fn sessions_destroyed_total() {
    metrics::counter!("sessions_destroyed_total").increment(1);
}
