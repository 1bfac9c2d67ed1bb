//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The encoder exited with a non-zero status.
    #[error("An error occured while converting the video! (exit code: {})", format_exit_code(.exit_code))]
    ConversionFailed {
        exit_code: Option<i32>,
        /// Last lines the encoder printed before exiting.
        tail: Vec<String>,
    },

    /// I/O error while running the encoder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Job was cancelled.
    #[error("Conversion cancelled")]
    Cancelled,
}

fn format_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

impl ConverterError {
    /// Creates a conversion failed error with the captured output tail.
    pub fn conversion_failed(exit_code: Option<i32>, tail: Vec<String>) -> Self {
        Self::ConversionFailed { exit_code, tail }
    }

    /// Whether this error came from a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_failed_display() {
        let err = ConverterError::conversion_failed(Some(1), vec!["boom".to_string()]);
        assert_eq!(
            err.to_string(),
            "An error occured while converting the video! (exit code: 1)"
        );

        let err = ConverterError::conversion_failed(None, Vec::new());
        assert!(err.to_string().contains("terminated by signal"));
    }
}
