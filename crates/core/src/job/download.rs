//! A single download job and its observable state.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::state::JobState;
use super::types::DownloadParameters;
use crate::progress::ProgressSink;

/// Sub-status shown while a job is being set up.
pub const STATUS_INITIALIZING: &str = "Initializing";

/// Rejected state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: JobState,
    pub to: JobState,
}

#[derive(Debug)]
struct JobInner {
    state: JobState,
    progress: f64,
    indeterminate: bool,
    status: String,
    log: String,
}

impl JobInner {
    fn new() -> Self {
        Self {
            state: JobState::Queued,
            progress: 0.0,
            indeterminate: false,
            status: STATUS_INITIALIZING.to_string(),
            log: String::new(),
        }
    }
}

/// One queued or running download.
///
/// Identity and parameters are immutable; everything a pipeline stage updates
/// lives behind a single lock that is never held across an await point.
#[derive(Debug)]
pub struct DownloadJob {
    id: String,
    params: DownloadParameters,
    created_at: DateTime<Utc>,
    inner: RwLock<JobInner>,
}

/// Point-in-time copy of a job.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: String,
    pub state: JobState,
    pub status: String,
    pub progress: f64,
    pub indeterminate: bool,
    pub created_at: DateTime<Utc>,
    pub params: DownloadParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

impl DownloadJob {
    /// Creates a queued job with a fresh v4 id.
    pub fn new(params: DownloadParameters) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            params,
            created_at: Utc::now(),
            inner: RwLock::new(JobInner::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &DownloadParameters {
        &self.params
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> JobState {
        self.inner.read().state
    }

    pub fn progress(&self) -> f64 {
        self.inner.read().progress
    }

    pub fn is_indeterminate(&self) -> bool {
        self.inner.read().indeterminate
    }

    /// User-facing status: the live sub-status while a pipeline runs,
    /// otherwise the state name.
    pub fn status(&self) -> String {
        let inner = self.inner.read();
        if inner.state.is_active() {
            inner.status.clone()
        } else {
            inner.state.to_string()
        }
    }

    pub fn log_text(&self) -> String {
        self.inner.read().log.clone()
    }

    /// Moves the job to `next`, returning the previous state.
    pub fn transition(&self, next: JobState) -> Result<JobState, InvalidTransition> {
        let mut inner = self.inner.write();
        let from = inner.state;
        if !from.can_transition_to(next) {
            return Err(InvalidTransition { from, to: next });
        }
        inner.state = next;
        Ok(from)
    }

    /// Puts a canceled or failed job back into the queue with a clean slate.
    pub fn reset_for_retry(&self) -> Result<JobState, InvalidTransition> {
        let mut inner = self.inner.write();
        let from = inner.state;
        if !from.can_retry() {
            return Err(InvalidTransition {
                from,
                to: JobState::Queued,
            });
        }
        *inner = JobInner::new();
        Ok(from)
    }

    /// Final progress bookkeeping once a pipeline has finished.
    pub fn finish_progress(&self) {
        let mut inner = self.inner.write();
        inner.progress = 100.0;
        inner.indeterminate = false;
    }

    /// Snapshot including the full log.
    pub fn snapshot(&self) -> JobSnapshot {
        self.snapshot_inner(true)
    }

    /// Snapshot without the log, for listings.
    pub fn summary(&self) -> JobSnapshot {
        self.snapshot_inner(false)
    }

    fn snapshot_inner(&self, with_log: bool) -> JobSnapshot {
        let inner = self.inner.read();
        let status = if inner.state.is_active() {
            inner.status.clone()
        } else {
            inner.state.to_string()
        };

        JobSnapshot {
            id: self.id.clone(),
            state: inner.state,
            status,
            progress: inner.progress,
            indeterminate: inner.indeterminate,
            created_at: self.created_at,
            params: self.params.clone(),
            log: with_log.then(|| inner.log.clone()),
        }
    }
}

impl ProgressSink for DownloadJob {
    fn log(&self, line: &str) {
        let mut inner = self.inner.write();
        inner.log.push_str(line);
        inner.log.push('\n');
    }

    fn set_status(&self, status: &str) {
        self.inner.write().status = status.to_string();
    }

    fn set_progress(&self, percent: f64) {
        self.inner.write().progress = percent.clamp(0.0, 100.0);
    }

    fn set_indeterminate(&self, indeterminate: bool) {
        self.inner.write().indeterminate = indeterminate;
    }
}
