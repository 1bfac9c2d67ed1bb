//! Job orchestrator: queue, scheduling and the per-job pipeline.
//!
//! Queued jobs are promoted in enqueue order whenever a pipeline slot is free
//! and promotion is not paused. Each promoted job runs in its own task:
//! resolve, fetch, merge and convert, ending in Done, Canceled or Error.
//!
//! # Example
//!
//! ```rust,ignore
//! use vodpipe_core::orchestrator::{JobOrchestrator, OrchestratorConfig, Pipeline};
//!
//! let orchestrator = JobOrchestrator::new(OrchestratorConfig::default(), pipeline);
//! orchestrator.start();
//!
//! let id = orchestrator.enqueue(params).await?;
//! let mut events = orchestrator.subscribe();
//! ```

mod config;
mod pipeline;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use pipeline::{
    cleanup_temp_dir, error_chain, prepare_temp_dir, temp_dir_for, Pipeline, PipelineError,
    TEMP_DIR_PREFIX,
};
pub use runner::JobOrchestrator;
pub use types::{JobEvent, OrchestratorError, OrchestratorStatus};
