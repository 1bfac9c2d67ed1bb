//! Types for the job orchestrator.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::JobState;

/// Errors returned by orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Job not found.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Invalid job state for operation.
    #[error("cannot {operation} job {id} in state {state}")]
    InvalidState {
        id: String,
        state: JobState,
        operation: &'static str,
    },

    /// The job still has a running pipeline.
    #[error("job {0} is still running")]
    JobActive(String),

    /// A queued or running job already writes this file.
    #[error("Output file already in use: {}", .0.display())]
    OutputPathInUse(PathBuf),

    /// The orchestrator no longer accepts work.
    #[error("orchestrator is shut down")]
    ShutDown,
}

/// Notification published on every change to the job list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    JobAdded {
        id: String,
    },
    JobStateChanged {
        id: String,
        from: JobState,
        to: JobState,
    },
    JobRemoved {
        id: String,
    },
    /// Size of the job list after an add or remove.
    DownloadsCountChanged {
        count: usize,
    },
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    /// Whether the scheduler loop is running.
    pub running: bool,
    /// Whether promotion of queued jobs is paused.
    pub paused: bool,
    /// Whether shutdown has been requested.
    pub shut_down: bool,
    /// Pipeline slots.
    pub max_active_jobs: usize,
    /// Jobs in the list.
    pub total_jobs: usize,
    pub queued_count: usize,
    /// Jobs with a running pipeline.
    pub active_count: usize,
    pub done_count: usize,
    pub canceled_count: usize,
    pub error_count: usize,
}
