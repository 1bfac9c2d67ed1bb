//! Progress reporting seam between pipeline stages and the job they run for.

/// Receives the user-visible output of a pipeline stage.
///
/// Implementations must be cheap and non-blocking: stages call these from
/// inside their hot loops, possibly from several concurrent segment workers.
pub trait ProgressSink: Send + Sync {
    /// Appends one line to the job log.
    fn log(&self, line: &str);

    /// Sets the live sub-status ("Downloading", "Merging files", ...).
    fn set_status(&self, status: &str);

    /// Sets the progress of the current stage, 0 to 100.
    fn set_progress(&self, percent: f64);

    /// Marks the progress as unknown (or known again).
    fn set_indeterminate(&self, indeterminate: bool);
}
