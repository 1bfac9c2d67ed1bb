//! Download job API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use vodpipe_core::{DownloadParameters, JobSnapshot, OrchestratorError};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing jobs
#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    /// Filter by state (`queued`, `downloading`, `done`, ...)
    pub state: Option<String>,
}

/// Response for job creation
#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub id: String,
}

/// Response for listing jobs
#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobSnapshot>,
    pub total: usize,
}

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct JobErrorResponse {
    pub error: String,
}

/// Status code plus JSON error body.
pub type ErrorReply = (StatusCode, Json<JobErrorResponse>);

fn error_reply(status: StatusCode, error: impl Into<String>) -> ErrorReply {
    (
        status,
        Json(JobErrorResponse {
            error: error.into(),
        }),
    )
}

impl From<OrchestratorError> for JobErrorResponse {
    fn from(err: OrchestratorError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

fn orchestrator_error(err: OrchestratorError) -> ErrorReply {
    let status = match err {
        OrchestratorError::JobNotFound(_) => StatusCode::NOT_FOUND,
        OrchestratorError::InvalidState { .. }
        | OrchestratorError::JobActive(_)
        | OrchestratorError::OutputPathInUse(_) => StatusCode::CONFLICT,
        OrchestratorError::ShutDown => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(JobErrorResponse::from(err)))
}

// ============================================================================
// Handlers
// ============================================================================

/// Queue a new download job
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(params): Json<DownloadParameters>,
) -> Result<(StatusCode, Json<CreateJobResponse>), ErrorReply> {
    if params.video.id.trim().is_empty() {
        return Err(error_reply(
            StatusCode::BAD_REQUEST,
            "video.id cannot be empty",
        ));
    }
    if params.filename.trim().is_empty() {
        return Err(error_reply(
            StatusCode::BAD_REQUEST,
            "filename cannot be empty",
        ));
    }

    if let Some(reason) = params.crop.invalid_reason() {
        return Err(error_reply(StatusCode::BAD_REQUEST, reason));
    }

    let output = params.full_path();
    match state.orchestrator().enqueue_exclusive(params).await {
        Ok(id) => {
            info!(job_id = %id, output = %output.display(), "Job created via API");
            Ok((StatusCode::CREATED, Json(CreateJobResponse { id })))
        }
        Err(e) => Err(orchestrator_error(e)),
    }
}

/// List jobs in queue order
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListJobsParams>,
) -> Json<ListJobsResponse> {
    let mut jobs = state.orchestrator().jobs().await;

    if let Some(ref wanted) = params.state {
        jobs.retain(|job| job.state.as_str() == wanted.as_str());
    }

    let total = jobs.len();
    Json(ListJobsResponse { jobs, total })
}

/// Get a job by ID, including its log
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobSnapshot>, ErrorReply> {
    match state.orchestrator().job(&id).await {
        Some(job) => Ok(Json(job)),
        None => Err(orchestrator_error(OrchestratorError::JobNotFound(id))),
    }
}

/// Remove a job from the list
pub async fn remove_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ErrorReply> {
    state
        .orchestrator()
        .remove(&id)
        .await
        .map_err(orchestrator_error)?;

    Ok(Json(MessageResponse {
        message: format!("Job {} removed", id),
    }))
}

/// Cancel a queued or running job
pub async fn cancel_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ErrorReply> {
    state
        .orchestrator()
        .cancel(&id)
        .await
        .map_err(orchestrator_error)?;

    Ok(Json(MessageResponse {
        message: format!("Cancellation requested for job {}", id),
    }))
}

/// Put a canceled or failed job back into the queue
pub async fn retry_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ErrorReply> {
    state
        .orchestrator()
        .retry(&id)
        .await
        .map_err(orchestrator_error)?;

    Ok(Json(MessageResponse {
        message: format!("Job {} queued for retry", id),
    }))
}
