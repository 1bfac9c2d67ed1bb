//! Error types for the resolver module.

use thiserror::Error;

use crate::fetcher::TransportError;

/// Errors that can occur while locating or fetching a media playlist.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Network failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The master playlist has no variant for the requested quality.
    #[error("No playlist found for quality '{quality}'")]
    QualityNotFound { quality: String },

    /// The media playlist came back empty.
    #[error("The playlist is empty: {url}")]
    EmptyPlaylist { url: String },
}
