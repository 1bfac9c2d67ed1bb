//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Jobs (started, finished by outcome, duration)
//! - Segment downloads (segments, bytes, retries)
//! - Conversion failures

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs promoted out of the queue.
pub static JOBS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("vodpipe_jobs_started_total", "Total jobs started").unwrap()
});

/// Jobs finished, by terminal state.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("vodpipe_jobs_finished_total", "Total jobs finished"),
        &["result"], // "done", "canceled", "error"
    )
    .unwrap()
});

/// Wall-clock duration of a pipeline run in seconds.
pub static JOB_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("vodpipe_job_duration_seconds", "Duration of pipeline runs").buckets(
            vec![
                10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0, 3600.0, 7200.0, 14400.0,
            ],
        ),
    )
    .unwrap()
});

// =============================================================================
// Segment Download Metrics
// =============================================================================

/// Segments written to disk.
pub static SEGMENTS_DOWNLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vodpipe_segments_downloaded_total",
        "Total segments downloaded",
    )
    .unwrap()
});

/// Segment download retries.
pub static SEGMENT_RETRIES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vodpipe_segment_retries_total",
        "Total segment download retries",
    )
    .unwrap()
});

/// Segment bytes downloaded.
pub static BYTES_DOWNLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vodpipe_bytes_downloaded_total",
        "Total segment bytes downloaded",
    )
    .unwrap()
});

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Encoder runs that exited with a failure status.
pub static CONVERSION_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "vodpipe_conversion_failures_total",
        "Total failed conversions",
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(JOBS_STARTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        // Segments
        Box::new(SEGMENTS_DOWNLOADED.clone()),
        Box::new(SEGMENT_RETRIES.clone()),
        Box::new(BYTES_DOWNLOADED.clone()),
        // Conversion
        Box::new(CONVERSION_FAILURES.clone()),
    ]
}

/// Registers every core metric with `registry`.
pub fn register_metrics(registry: &prometheus::Registry) -> prometheus::Result<()> {
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_register_metrics() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();

        JOBS_FINISHED.with_label_values(&["done"]).inc();
        JOBS_STARTED.inc();

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"vodpipe_jobs_started_total".to_string()));
        assert!(names.contains(&"vodpipe_jobs_finished_total".to_string()));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        register_metrics(&registry).unwrap();
        assert!(register_metrics(&registry).is_err());
    }
}
