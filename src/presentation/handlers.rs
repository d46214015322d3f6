// HTTP request handlers
use crate::domain::display::DisplayState;
use crate::presentation::app_state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Health check endpoint, unhealthy once the poller has stopped
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.scheduler.is_running() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "poller stopped")
    }
}

/// Current display state (label, tooltip, kind, last update)
pub async fn display_status(State(state): State<Arc<AppState>>) -> Json<DisplayState> {
    Json(state.scheduler.current())
}

/// Manual refresh, the equivalent of clicking the panel
pub async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.scheduler.trigger_now() {
        (StatusCode::ACCEPTED, "refresh scheduled")
    } else {
        (StatusCode::CONFLICT, "poller is not running")
    }
}
