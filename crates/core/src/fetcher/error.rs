//! Error types for the fetcher module.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single transport request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Server answered with a non-success status.
    #[error("HTTP {status} for {uri}")]
    Status { uri: String, status: u16 },

    /// Request timed out.
    #[error("request to {uri} timed out")]
    Timeout { uri: String },

    /// Connection or protocol failure.
    #[error("request to {uri} failed: {reason}")]
    Request { uri: String, reason: String },

    /// HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl TransportError {
    pub fn request(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Request {
            uri: uri.into(),
            reason: reason.into(),
        }
    }
}

/// Errors that abort a whole segment download.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A segment kept failing after every retry.
    #[error("could not download '{uri}' after {retries} retries: {last_error}")]
    RetriesExhausted {
        uri: String,
        retries: u32,
        last_error: TransportError,
    },

    /// Writing a downloaded segment to disk failed.
    #[error("failed to write segment to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The download was cancelled.
    #[error("segment download cancelled")]
    Cancelled,
}
