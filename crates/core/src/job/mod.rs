//! Download jobs: request parameters, state machine, and live job state.

mod download;
mod state;
mod types;

pub use download::{DownloadJob, InvalidTransition, JobSnapshot, STATUS_INITIALIZING};
pub use state::JobState;
pub use types::{DownloadParameters, Quality, VideoRef, VodAuth};
