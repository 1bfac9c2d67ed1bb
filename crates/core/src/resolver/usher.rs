//! Master-playlist based resolver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use tracing::{debug, info};

use super::config::ResolverConfig;
use super::error::ResolverError;
use super::traits::PlaylistResolver;
use crate::fetcher::{HttpTransport, SegmentTransport, TransportError};
use crate::job::{Quality, VodAuth};

const CLIENT_ID_HEADER: HeaderName = HeaderName::from_static("client-id");

/// Picks the variant URL for `quality_id` from a master playlist.
///
/// Comment lines are skipped; the first remaining line whose lowercase form
/// contains `/<quality_id>/` wins.
pub fn select_quality_url(master: &str, quality_id: &str) -> Option<String> {
    let needle = format!("/{}/", quality_id.to_lowercase());

    master
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .find(|line| line.to_lowercase().contains(&needle))
        .map(str::to_string)
}

/// Resolves playlists through the usher master-playlist endpoint.
pub struct UsherResolver {
    transport: Arc<dyn SegmentTransport>,
    config: ResolverConfig,
}

impl UsherResolver {
    pub fn new(transport: Arc<dyn SegmentTransport>, config: ResolverConfig) -> Self {
        Self { transport, config }
    }

    /// Builds a resolver with its own HTTP client carrying the configured
    /// `Client-ID` header.
    pub fn from_config(config: ResolverConfig) -> Result<Self, ResolverError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        if !config.client_id.is_empty() {
            let value = HeaderValue::from_str(&config.client_id)
                .map_err(|e| TransportError::Client(format!("invalid client id: {}", e)))?;
            headers.insert(CLIENT_ID_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self::new(Arc::new(HttpTransport::with_client(client)), config))
    }

    /// Master playlist URL for a video, with the access token filled in.
    pub fn master_playlist_url(&self, video_id: &str, auth: &VodAuth) -> String {
        self.config
            .playlists_url_template
            .replace("{id}", &urlencoding::encode(video_id))
            .replace("{sig}", &urlencoding::encode(&auth.signature))
            .replace("{token}", &urlencoding::encode(&auth.token))
    }
}

#[async_trait]
impl PlaylistResolver for UsherResolver {
    async fn resolve_playlist_url(
        &self,
        video_id: &str,
        quality: &Quality,
        auth: &VodAuth,
    ) -> Result<String, ResolverError> {
        let master_url = self.master_playlist_url(video_id, auth);
        debug!(video_id, "Fetching master playlist");

        let master = self.transport.fetch_text(&master_url).await?;

        let url = select_quality_url(&master, &quality.id).ok_or_else(|| {
            ResolverError::QualityNotFound {
                quality: quality.id.clone(),
            }
        })?;

        info!(video_id, quality = %quality.id, "Resolved playlist url");
        Ok(url)
    }

    async fn fetch_manifest(&self, playlist_url: &str) -> Result<String, ResolverError> {
        let manifest = self.transport.fetch_text(playlist_url).await?;

        if manifest.trim().is_empty() {
            return Err(ResolverError::EmptyPlaylist {
                url: playlist_url.to_string(),
            });
        }

        Ok(manifest)
    }
}
