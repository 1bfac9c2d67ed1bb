//! Trait definitions for the resolver module.

use async_trait::async_trait;

use super::error::ResolverError;
use crate::job::{Quality, VodAuth};

/// Turns a video reference into a media playlist.
#[async_trait]
pub trait PlaylistResolver: Send + Sync {
    /// Returns the media playlist URL for `quality`.
    async fn resolve_playlist_url(
        &self,
        video_id: &str,
        quality: &Quality,
        auth: &VodAuth,
    ) -> Result<String, ResolverError>;

    /// Downloads the media playlist text. Empty or blank bodies are an error.
    async fn fetch_manifest(&self, playlist_url: &str) -> Result<String, ResolverError>;
}
