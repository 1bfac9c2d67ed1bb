pub mod concat;
pub mod config;
pub mod converter;
pub mod fetcher;
pub mod job;
pub mod metrics;
pub mod orchestrator;
pub mod playlist;
pub mod progress;
pub mod resolver;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use job::{DownloadJob, DownloadParameters, JobSnapshot, JobState, Quality, VideoRef, VodAuth};
pub use orchestrator::{
    JobEvent, JobOrchestrator, OrchestratorConfig, OrchestratorError, OrchestratorStatus, Pipeline,
};
pub use progress::ProgressSink;
