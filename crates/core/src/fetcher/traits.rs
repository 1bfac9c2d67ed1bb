//! Trait definitions for the fetcher module.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::TransportError;

/// Raw-bytes fetch primitive used for manifests and segments.
#[async_trait]
pub trait SegmentTransport: Send + Sync {
    /// Downloads the full body behind `uri`.
    async fn fetch(&self, uri: &str) -> Result<Bytes, TransportError>;

    /// Downloads `uri` and decodes it as UTF-8 text.
    async fn fetch_text(&self, uri: &str) -> Result<String, TransportError> {
        let bytes = self.fetch(uri).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
