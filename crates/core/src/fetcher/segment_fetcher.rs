//! Bounded-parallel segment downloader.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::playlist::{Playlist, Segment};
use crate::progress::ProgressSink;

use super::config::FetcherConfig;
use super::error::FetchError;
use super::traits::SegmentTransport;

/// Outcome of a completed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    /// Segments written to disk.
    pub segments: usize,
    /// Total bytes written.
    pub bytes: u64,
}

/// Downloads every segment of a playlist to its local path.
pub struct SegmentFetcher {
    transport: Arc<dyn SegmentTransport>,
    config: FetcherConfig,
}

impl SegmentFetcher {
    pub fn new(transport: Arc<dyn SegmentTransport>, config: FetcherConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Downloads all segments with at most `max_parallel` requests in flight.
    ///
    /// Progress is published after every written segment as
    /// `completed / total * 100` and forced to 100 on success. Once `cancel`
    /// trips no new segment is started; requests already in flight are allowed
    /// to finish and the call returns [`FetchError::Cancelled`].
    pub async fn download_all(
        &self,
        playlist: &Playlist,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<FetchSummary, FetchError> {
        let total = playlist.len();

        sink.log("");
        sink.log("Starting parallel video chunk download");
        sink.log(&format!("Number of video chunks to download: {}", total));
        sink.log(&format!(
            "Maximum connection count: {}",
            self.config.max_parallel + 1
        ));
        sink.log("Parallel video chunk download is running...");

        info!(
            segments = total,
            parallel = self.config.max_parallel,
            "Starting segment download"
        );

        let completed = AtomicUsize::new(0);
        let bytes = AtomicU64::new(0);

        let mut downloads = stream::iter(playlist.iter().cloned())
            .map(|segment: Segment| {
                let completed = &completed;
                let bytes = &bytes;
                async move {
                    if cancel.is_cancelled() {
                        return Ok(());
                    }

                    let written = self.download_segment(&segment, cancel, sink).await?;

                    bytes.fetch_add(written, Ordering::SeqCst);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    sink.set_progress(done as f64 / total as f64 * 100.0);
                    Ok(())
                }
            })
            .buffer_unordered(self.config.max_parallel);

        while let Some(result) = downloads.next().await {
            match result {
                Ok(()) | Err(FetchError::Cancelled) => {}
                Err(e) => return Err(e),
            }
        }
        drop(downloads);

        if cancel.is_cancelled() {
            debug!(
                completed = completed.load(Ordering::SeqCst),
                total, "Segment download cancelled"
            );
            return Err(FetchError::Cancelled);
        }

        sink.set_progress(100.0);
        sink.log("Download of all video chunks complete!");

        let summary = FetchSummary {
            segments: completed.load(Ordering::SeqCst),
            bytes: bytes.load(Ordering::SeqCst),
        };
        info!(segments = summary.segments, bytes = summary.bytes, "Segment download complete");

        Ok(summary)
    }

    /// Downloads one segment, retrying transport failures.
    async fn download_segment(
        &self,
        segment: &Segment,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<u64, FetchError> {
        let mut retries = 0;

        loop {
            match self.transport.fetch(&segment.remote_uri).await {
                Ok(body) => {
                    write_segment(segment, &body).await?;
                    metrics::SEGMENTS_DOWNLOADED.inc();
                    metrics::BYTES_DOWNLOADED.inc_by(body.len() as u64);
                    return Ok(body.len() as u64);
                }
                Err(e) if retries < self.config.max_retries => {
                    retries += 1;
                    metrics::SEGMENT_RETRIES.inc();
                    warn!(
                        uri = %segment.remote_uri,
                        attempt = retries,
                        error = %e,
                        "Segment download failed, retrying"
                    );
                    sink.log(&format!(
                        "Downloading file '{}' failed! Trying again in {}s",
                        segment.remote_uri,
                        self.config.retry_delay.as_secs_f64()
                    ));
                    sink.log(&e.to_string());

                    tokio::select! {
                        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                        _ = tokio::time::sleep(self.config.retry_delay) => {}
                    }
                }
                Err(e) => {
                    return Err(FetchError::RetriesExhausted {
                        uri: segment.remote_uri.clone(),
                        retries: self.config.max_retries,
                        last_error: e,
                    });
                }
            }
        }
    }
}

async fn write_segment(segment: &Segment, body: &[u8]) -> Result<(), FetchError> {
    let to_write_error = |source| FetchError::Write {
        path: segment.local_path.clone(),
        source,
    };

    match tokio::fs::remove_file(&segment.local_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(to_write_error(e)),
    }

    tokio::fs::write(&segment.local_path, body)
        .await
        .map_err(to_write_error)
}
