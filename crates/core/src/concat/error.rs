//! Error types for the concat module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while merging segments.
#[derive(Debug, Error)]
pub enum ConcatError {
    /// There is nothing to merge.
    #[error("Playlist is empty, nothing to merge")]
    EmptyPlaylist,

    /// The output file could not be created or written.
    #[error("Failed to write output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A segment file could not be read or deleted.
    #[error("Failed to process segment file {path}: {source}")]
    Segment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
