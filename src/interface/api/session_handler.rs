//! Monitoring API handlers

use super::session_dto::{ApiResponse, SessionListResponse};
use super::voice_handler::AppState;
use axum::{extract::State, Json};
use tracing::info;

/// Health check endpoint
pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("OK"))
}

/// List active call sessions
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Json<ApiResponse<SessionListResponse>> {
    info!("API: Listing active sessions");

    let sessions = state.sessions.list().await;
    let total = sessions.len();

    Json(ApiResponse::success(SessionListResponse { sessions, total }))
}
