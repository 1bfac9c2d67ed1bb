//! Progress sink that records everything it receives.

use parking_lot::Mutex;

use crate::progress::ProgressSink;

#[derive(Debug, Default)]
struct Recorded {
    logs: Vec<String>,
    statuses: Vec<String>,
    progress: Vec<f64>,
    indeterminate: Vec<bool>,
}

/// [`ProgressSink`] that keeps every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    recorded: Mutex<Recorded>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logs(&self) -> Vec<String> {
        self.recorded.lock().logs.clone()
    }

    /// All log lines joined with newlines.
    pub fn log_text(&self) -> String {
        self.recorded.lock().logs.join("\n")
    }

    pub fn statuses(&self) -> Vec<String> {
        self.recorded.lock().statuses.clone()
    }

    pub fn progress(&self) -> Vec<f64> {
        self.recorded.lock().progress.clone()
    }

    pub fn indeterminate(&self) -> Vec<bool> {
        self.recorded.lock().indeterminate.clone()
    }
}

impl ProgressSink for RecordingSink {
    fn log(&self, line: &str) {
        self.recorded.lock().logs.push(line.to_string());
    }

    fn set_status(&self, status: &str) {
        self.recorded.lock().statuses.push(status.to_string());
    }

    fn set_progress(&self, percent: f64) {
        self.recorded.lock().progress.push(percent);
    }

    fn set_indeterminate(&self, indeterminate: bool) {
        self.recorded.lock().indeterminate.push(indeterminate);
    }
}
