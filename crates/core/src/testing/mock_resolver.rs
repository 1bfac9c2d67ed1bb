//! Mock playlist resolver for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::job::{Quality, VodAuth};
use crate::resolver::{PlaylistResolver, ResolverError};

/// Controllable implementation of [`PlaylistResolver`].
///
/// Every video resolves to `<base>/<video id>/<quality id>/index.m3u8`.
/// Manifests are served from a map keyed by that URL. The resolver can be
/// held closed so that pipelines park inside it until [`release`] is called.
///
/// [`release`]: MockResolver::release
#[derive(Debug)]
pub struct MockResolver {
    base_url: String,
    manifests: Mutex<HashMap<String, String>>,
    next_error: Mutex<Option<ResolverError>>,
    resolve_calls: AtomicUsize,
    manifest_calls: AtomicUsize,
    gate: watch::Sender<bool>,
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResolver {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            base_url: "http://mock.cdn".to_string(),
            manifests: Mutex::new(HashMap::new()),
            next_error: Mutex::new(None),
            resolve_calls: AtomicUsize::new(0),
            manifest_calls: AtomicUsize::new(0),
            gate,
        }
    }

    /// URL the resolver hands out for a video and quality.
    pub fn playlist_url(&self, video_id: &str, quality_id: &str) -> String {
        format!("{}/{}/{}/index.m3u8", self.base_url, video_id, quality_id)
    }

    /// Serves `manifest` for `video_id` at `quality_id`.
    pub fn set_manifest(&self, video_id: &str, quality_id: &str, manifest: impl Into<String>) {
        self.manifests
            .lock()
            .insert(self.playlist_url(video_id, quality_id), manifest.into());
    }

    /// Fails the next resolve call with `error`.
    pub fn set_next_error(&self, error: ResolverError) {
        *self.next_error.lock() = Some(error);
    }

    /// Blocks resolve calls until [`MockResolver::release`] is called.
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    /// Lets blocked and future resolve calls through.
    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn manifest_calls(&self) -> usize {
        self.manifest_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaylistResolver for MockResolver {
    async fn resolve_playlist_url(
        &self,
        video_id: &str,
        quality: &Quality,
        _auth: &VodAuth,
    ) -> Result<String, ResolverError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.gate.subscribe();
        // the sender lives in self, so the channel cannot close here
        let _ = gate.wait_for(|open| *open).await;

        if let Some(error) = self.next_error.lock().take() {
            return Err(error);
        }

        Ok(self.playlist_url(video_id, &quality.id))
    }

    async fn fetch_manifest(&self, playlist_url: &str) -> Result<String, ResolverError> {
        self.manifest_calls.fetch_add(1, Ordering::SeqCst);

        match self.manifests.lock().get(playlist_url) {
            Some(manifest) if !manifest.trim().is_empty() => Ok(manifest.clone()),
            _ => Err(ResolverError::EmptyPlaylist {
                url: playlist_url.to_string(),
            }),
        }
    }
}
