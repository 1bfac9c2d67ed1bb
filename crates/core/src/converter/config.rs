//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Number of trailing encoder output lines kept for failure reports.
    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: usize,

    /// Value passed to `-analyzeduration`.
    #[serde(default = "default_probe_limit")]
    pub analyze_duration: i64,

    /// Value passed to `-probesize`.
    #[serde(default = "default_probe_limit")]
    pub probe_size: i64,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_log_tail_lines() -> usize {
    200
}

fn default_probe_limit() -> i64 {
    i32::MAX as i64
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            log_tail_lines: default_log_tail_lines(),
            analyze_duration: default_probe_limit(),
            probe_size: default_probe_limit(),
        }
    }
}

impl ConverterConfig {
    /// Creates a config pointing at a specific ffmpeg binary.
    pub fn with_ffmpeg_path(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ..Default::default()
        }
    }

    /// Sets how many output lines are kept for failure reports.
    pub fn with_log_tail_lines(mut self, lines: usize) -> Self {
        self.log_tail_lines = lines;
        self
    }
}
