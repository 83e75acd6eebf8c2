//! Prometheus metrics handler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics exporter
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new().install_recorder().unwrap();

    // Describe metrics
    describe_counter!(
        "ivr_calls_started_total",
        "Total number of call flow sessions started"
    );
    describe_counter!(
        "ivr_calls_completed_total",
        "Total number of call flow sessions that ran to completion"
    );
    describe_counter!(
        "ivr_turns_failed_total",
        "Total number of flow turns that failed"
    );
    describe_counter!(
        "ivr_silent_completions_total",
        "Total number of final responses with no caller-facing verbs"
    );
    describe_gauge!(
        "ivr_active_sessions",
        "Number of currently suspended call flow sessions"
    );

    handle
}

/// HTTP metrics handler
pub async fn metrics_handler(
    axum::extract::State(prometheus_handle): axum::extract::State<PrometheusHandle>,
) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}

/// Record a session start
pub fn record_call_started(flow: &str) {
    counter!("ivr_calls_started_total", "flow" => flow.to_string()).increment(1);
}

/// Record a session that ran to completion
pub fn record_call_completed() {
    counter!("ivr_calls_completed_total").increment(1);
}

/// Record a failed flow turn
pub fn record_turn_failed(reason: &str) {
    counter!("ivr_turns_failed_total", "reason" => reason.to_string()).increment(1);
}

/// Record a final response that left the caller in silence
pub fn record_silent_completion() {
    counter!("ivr_silent_completions_total").increment(1);
}

/// Update active sessions gauge
pub fn update_active_sessions(count: usize) {
    gauge!("ivr_active_sessions").set(count as f64);
}
