//! Streaming merge of segment files.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use super::error::ConcatError;
use crate::playlist::Playlist;
use crate::progress::ProgressSink;

const COPY_BUFFER_SIZE: usize = 4096;

/// Appends every segment of `playlist` to `output` in order.
///
/// The output is created or truncated first. Each segment is deleted once
/// copied and progress `(i + 1) / total * 100` is reported after it. Returns
/// the number of bytes written.
pub async fn concat_segments(
    playlist: &Playlist,
    output: &Path,
    sink: &dyn ProgressSink,
) -> Result<u64, ConcatError> {
    if playlist.is_empty() {
        return Err(ConcatError::EmptyPlaylist);
    }

    let output_error = |source| ConcatError::Output {
        path: output.to_path_buf(),
        source,
    };

    sink.set_status("Merging files");
    sink.set_progress(0.0);
    sink.log("");
    sink.log(&format!("Merging all VOD parts into '{}'...", output.display()));

    info!(
        segments = playlist.len(),
        output = %output.display(),
        "Merging segments"
    );

    let mut out = File::create(output).await.map_err(output_error)?;
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let total = playlist.len();
    let mut written: u64 = 0;

    for (i, segment) in playlist.iter().enumerate() {
        let segment_error = |source| ConcatError::Segment {
            path: segment.local_path.clone(),
            source,
        };

        let mut part = File::open(&segment.local_path)
            .await
            .map_err(segment_error)?;

        loop {
            let n = part.read(&mut buf).await.map_err(segment_error)?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n]).await.map_err(output_error)?;
            written += n as u64;
        }
        drop(part);

        tokio::fs::remove_file(&segment.local_path)
            .await
            .map_err(segment_error)?;

        sink.set_progress((i + 1) as f64 / total as f64 * 100.0);
    }

    out.flush().await.map_err(output_error)?;

    sink.set_progress(100.0);
    debug!(bytes = written, "Merge complete");

    Ok(written)
}
