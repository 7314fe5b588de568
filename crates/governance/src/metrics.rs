//! Metrics implementation using Prometheus.

use concierge_core::{Error, ErrorKind, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::internal(format!("Failed to install Prometheus recorder: {}", e)))?;

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// Track HTTP request metrics (latency, count).
pub fn track_request(method: &str, path: &str, status: u16, latency_sec: f64) {
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(latency_sec);
}

/// Track one conversation turn.
pub fn track_turn(channel: &str, intents: usize, all_failed: bool, latency_sec: f64) {
    let outcome = if all_failed { "fallback" } else { "answered" };
    metrics::counter!(
        "concierge_turns_total",
        "channel" => channel.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("concierge_turn_intents").record(intents as f64);
    metrics::histogram!("concierge_turn_duration_seconds", "channel" => channel.to_string())
        .record(latency_sec);
}

/// Track one capability invocation.
pub fn track_agent(intent: &str, success: bool, error: Option<ErrorKind>, latency_sec: f64) {
    let error = error.map(|k| k.as_str()).unwrap_or("none");
    metrics::counter!(
        "concierge_agent_results_total",
        "intent" => intent.to_string(),
        "success" => success.to_string(),
        "error" => error
    )
    .increment(1);
    metrics::histogram!("concierge_agent_duration_seconds", "intent" => intent.to_string())
        .record(latency_sec);
}
