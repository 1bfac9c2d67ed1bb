//! Orchestrator API handlers.

use axum::{extract::State, Json};
use std::sync::Arc;
use vodpipe_core::OrchestratorStatus;

use super::jobs::MessageResponse;
use crate::state::AppState;

/// Get orchestrator status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator().status().await)
}

/// Stop promoting queued jobs
pub async fn pause(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.orchestrator().pause();
    Json(MessageResponse {
        message: "Orchestrator paused".to_string(),
    })
}

/// Resume promoting queued jobs
pub async fn resume(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.orchestrator().resume();
    Json(MessageResponse {
        message: "Orchestrator resumed".to_string(),
    })
}
