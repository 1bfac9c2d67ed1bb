//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the job orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How often the scheduler looks for a queued job to promote (milliseconds).
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Maximum number of pipelines running at once.
    #[serde(default = "default_max_active_jobs")]
    pub max_active_jobs: usize,

    /// Drop jobs from the list as soon as they finish successfully.
    #[serde(default)]
    pub remove_completed: bool,

    /// Start with promotion paused.
    #[serde(default)]
    pub start_paused: bool,
}

fn default_tick_interval() -> u64 {
    2000 // 2 seconds
}

fn default_max_active_jobs() -> usize {
    1
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            max_active_jobs: default_max_active_jobs(),
            remove_completed: false,
            start_paused: false,
        }
    }
}

impl OrchestratorConfig {
    /// Sets the scheduler tick interval.
    pub fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    /// Sets the number of concurrently running pipelines.
    pub fn with_max_active_jobs(mut self, max_active_jobs: usize) -> Self {
        self.max_active_jobs = max_active_jobs;
        self
    }

    /// Enables removal of successfully finished jobs.
    pub fn with_remove_completed(mut self, remove_completed: bool) -> Self {
        self.remove_completed = remove_completed;
        self
    }
}
