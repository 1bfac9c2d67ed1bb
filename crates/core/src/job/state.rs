//! Download job state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a download job.
///
/// ```text
/// Queued -> Initializing -> Downloading -> Merging -> [Converting] -> Done
///    \___________\_______________\____________\____________\-> Canceled | Error
/// Canceled | Error -> Queued   (retry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Initializing,
    Downloading,
    Merging,
    Converting,
    Done,
    Canceled,
    Error,
}

impl JobState {
    /// Returns true if no pipeline will touch the job again without a retry.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Canceled | JobState::Error)
    }

    /// Returns true while a pipeline task is running for the job.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobState::Initializing | JobState::Downloading | JobState::Merging | JobState::Converting
        )
    }

    /// Returns true if the job may be put back into the queue.
    pub fn can_retry(&self) -> bool {
        matches!(self, JobState::Canceled | JobState::Error)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        use JobState::*;

        if matches!(next, Canceled | Error) {
            return !self.is_terminal();
        }

        match (self, next) {
            (Queued, Initializing) => true,
            (Initializing, Downloading) => true,
            (Downloading, Merging) => true,
            (Merging, Converting) | (Merging, Done) => true,
            (Converting, Done) => true,
            (Canceled, Queued) | (Error, Queued) => true,
            _ => false,
        }
    }

    /// Lowercase identifier used in API filters and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Initializing => "initializing",
            JobState::Downloading => "downloading",
            JobState::Merging => "merging",
            JobState::Converting => "converting",
            JobState::Done => "done",
            JobState::Canceled => "canceled",
            JobState::Error => "error",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Queued => "Queued",
            JobState::Initializing => "Initializing",
            JobState::Downloading => "Downloading",
            JobState::Merging => "Merging",
            JobState::Converting => "Converting",
            JobState::Done => "Done",
            JobState::Canceled => "Canceled",
            JobState::Error => "Error",
        };
        f.write_str(name)
    }
}
