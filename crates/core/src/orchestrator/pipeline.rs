//! Per-job pipeline: resolve, parse, crop, download, merge, convert.

use std::error::Error as StdError;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::types::JobEvent;
use crate::concat::{concat_segments, ConcatError};
use crate::converter::{ConversionJob, Converter, ConverterError};
use crate::fetcher::{FetchError, SegmentFetcher};
use crate::job::{DownloadJob, InvalidTransition, JobState, STATUS_INITIALIZING};
use crate::metrics;
use crate::playlist::{self, apply_crop, url_prefix_of, PlaylistError};
use crate::progress::ProgressSink;
use crate::resolver::{PlaylistResolver, ResolverError};

/// Prefix of every per-job temporary directory.
pub const TEMP_DIR_PREFIX: &str = "TL_";

const SEPARATOR: &str = "--------------------------------------------------------------------------------";

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Temporary download directory '{path}' is not empty!")]
    TempDirNotEmpty { path: PathBuf },

    #[error("Failed to prepare temporary download directory '{path}'")]
    TempDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to resolve the playlist")]
    Resolver(#[from] ResolverError),

    #[error("Failed to parse the playlist")]
    Playlist(#[from] PlaylistError),

    #[error("Failed to download the video chunks")]
    Fetch(#[from] FetchError),

    #[error("Failed to merge the video chunks")]
    Concat(#[from] ConcatError),

    #[error("Failed to convert the video")]
    Converter(#[from] ConverterError),

    #[error("Job changed state unexpectedly")]
    InvalidTransition(#[from] InvalidTransition),

    #[error("Download task was canceled")]
    Cancelled,
}

impl PipelineError {
    /// Whether the run stopped because it was asked to.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            PipelineError::Cancelled
                | PipelineError::Fetch(FetchError::Cancelled)
                | PipelineError::Converter(ConverterError::Cancelled)
        )
    }
}

/// Renders an error and all of its sources, one per line.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Per-job temporary directory under `temp_root`.
pub fn temp_dir_for(temp_root: &Path, job_id: &str) -> PathBuf {
    temp_root.join(format!("{}{}", TEMP_DIR_PREFIX, job_id))
}

/// Creates `dir` if needed and checks that it holds nothing.
pub async fn prepare_temp_dir(dir: &Path, sink: &dyn ProgressSink) -> Result<(), PipelineError> {
    let io_error = |source| PipelineError::TempDir {
        path: dir.to_path_buf(),
        source,
    };

    if !tokio::fs::try_exists(dir).await.map_err(io_error)? {
        sink.log("");
        sink.log(&format!(
            "Creating temporary download directory '{}'...",
            dir.display()
        ));
        tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
        sink.log("done!");
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    if entries.next_entry().await.map_err(io_error)?.is_some() {
        return Err(PipelineError::TempDirNotEmpty {
            path: dir.to_path_buf(),
        });
    }

    Ok(())
}

/// Deletes `dir` and everything in it. Failures are only logged.
pub async fn cleanup_temp_dir(dir: &Path, sink: &dyn ProgressSink) {
    sink.log(&format!("Deleting directory '{}'...", dir.display()));
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => sink.log("done!"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => sink.log("done!"),
        Err(e) => debug!(dir = %dir.display(), error = %e, "Temp directory cleanup failed"),
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

/// Awaits `fut` unless `cancel` trips first.
async fn until_cancelled<T, E, F>(cancel: &CancellationToken, fut: F) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, E>>,
    PipelineError: From<E>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        result = fut => result.map_err(PipelineError::from),
    }
}

fn format_hms(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Drives one job from Initializing to a terminal state.
pub struct Pipeline {
    resolver: Arc<dyn PlaylistResolver>,
    fetcher: SegmentFetcher,
    converter: Arc<dyn Converter>,
    temp_root: PathBuf,
}

impl Pipeline {
    pub fn new(
        resolver: Arc<dyn PlaylistResolver>,
        fetcher: SegmentFetcher,
        converter: Arc<dyn Converter>,
        temp_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            converter,
            temp_root: temp_root.into(),
        }
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Runs the whole pipeline for a job that has just been promoted to
    /// Initializing, and returns the terminal state it ended in.
    ///
    /// The temporary directory is removed whatever the outcome.
    pub async fn run(
        &self,
        job: &DownloadJob,
        cancel: &CancellationToken,
        events: &broadcast::Sender<JobEvent>,
    ) -> JobState {
        let started = Instant::now();
        let temp_dir = temp_dir_for(&self.temp_root, job.id());

        info!(job_id = %job.id(), video_id = %job.params().video.id, "Pipeline started");

        let result = self.execute(job, &temp_dir, cancel, events).await;

        job.log("");
        job.log("Starting temporary download folder cleanup!");
        cleanup_temp_dir(&temp_dir, job).await;

        job.finish_progress();

        let final_state = match result {
            Ok(()) => {
                job.log("");
                job.log("Download task ended successfully!");
                info!(job_id = %job.id(), "Pipeline finished");
                JobState::Done
            }
            Err(e) if e.is_cancelled() => {
                job.log("");
                job.log("Download task was canceled!");
                info!(job_id = %job.id(), "Pipeline canceled");
                JobState::Canceled
            }
            Err(e) => {
                let chain = error_chain(&e);
                job.log("");
                job.log("Download task ended with an error!");
                job.log("");
                job.log(&chain);
                error!(job_id = %job.id(), error = %chain, "Pipeline failed");
                JobState::Error
            }
        };

        if let Err(e) = advance(job, final_state, events) {
            warn!(job_id = %job.id(), error = %e, "Could not record final job state");
        }

        metrics::JOBS_FINISHED
            .with_label_values(&[final_state.as_str()])
            .inc();
        metrics::JOB_DURATION.observe(started.elapsed().as_secs_f64());

        final_state
    }

    async fn execute(
        &self,
        job: &DownloadJob,
        temp_dir: &Path,
        cancel: &CancellationToken,
        events: &broadcast::Sender<JobEvent>,
    ) -> Result<(), PipelineError> {
        let params = job.params();

        job.set_status(STATUS_INITIALIZING);
        job.log("Download task has been started!");
        self.write_header(job, temp_dir);

        prepare_temp_dir(temp_dir, job).await?;
        ensure_not_cancelled(cancel)?;

        job.log("");
        job.log("Retrieving m3u8 playlist urls for all VOD qualities...");
        let playlist_url = until_cancelled(
            cancel,
            self.resolver
                .resolve_playlist_url(&params.video.id, &params.quality, &params.auth),
        )
        .await?;
        job.log(&format!(
            "Playlist url for selected quality {} is {}",
            params.quality.label(),
            playlist_url
        ));
        ensure_not_cancelled(cancel)?;

        job.log("");
        job.log("Retrieving playlist...");
        let manifest = until_cancelled(cancel, self.resolver.fetch_manifest(&playlist_url)).await?;
        job.log("Parsing playlist...");
        let mut playlist = playlist::parse(temp_dir, &manifest, url_prefix_of(&playlist_url))?;
        job.log(&format!("Number of video chunks: {}", playlist.len()));
        ensure_not_cancelled(cancel)?;

        let crop = params.crop.resolve(params.video.length_secs);
        let window = apply_crop(&mut playlist, &crop);
        if crop.trim_start || crop.trim_end {
            job.log(&format!(
                "Number of video chunks after cropping: {}",
                playlist.len()
            ));
        }
        debug!(job_id = %job.id(), ?window, segments = playlist.len(), "Playlist cropped");
        ensure_not_cancelled(cancel)?;

        advance(job, JobState::Downloading, events)?;
        job.set_status("Downloading");
        job.set_progress(0.0);
        self.fetcher.download_all(&playlist, cancel, job).await?;
        ensure_not_cancelled(cancel)?;

        advance(job, JobState::Merging, events)?;
        let concat_target = if params.disable_conversion {
            tokio::fs::create_dir_all(&params.folder)
                .await
                .map_err(|source| ConcatError::Output {
                    path: params.folder.clone(),
                    source,
                })?;
            params.full_path()
        } else {
            temp_dir.join(format!("{}.ts", params.output_stem()))
        };
        concat_segments(&playlist, &concat_target, job).await?;

        if !params.disable_conversion {
            ensure_not_cancelled(cancel)?;
            advance(job, JobState::Converting, events)?;
            let conversion =
                ConversionJob::new(job.id(), concat_target, params.full_path(), window);
            self.converter.convert(&conversion, cancel, job).await?;
        }

        Ok(())
    }

    fn write_header(&self, job: &DownloadJob, temp_dir: &Path) {
        let params = job.params();
        let crop = &params.crop;
        let crop_line = |enabled: bool, secs: f64| {
            if enabled {
                format!("Yes ({})", format_hms(secs))
            } else {
                "No".to_string()
            }
        };

        let lines = [
            String::new(),
            "VOD INFO".to_string(),
            SEPARATOR.to_string(),
            format!("VOD ID: {}", params.video.id),
            format!("Selected Quality: {}", params.quality.label()),
            format!("Download Url: {}", params.video.url),
            format!("Crop Start: {}", crop_line(crop.trim_start, crop.start_secs)),
            format!("Crop End: {}", crop_line(crop.trim_end, crop.end_secs)),
            String::new(),
            "OUTPUT INFO".to_string(),
            SEPARATOR.to_string(),
            format!("Disable Conversion: {}", yes_no(params.disable_conversion)),
            format!("Output File: {}", params.full_path().display()),
            format!("Converter: {}", self.converter.name()),
            format!("Temporary Download Folder: {}", temp_dir.display()),
            String::new(),
            "ACCESS INFO".to_string(),
            SEPARATOR.to_string(),
            format!("Token: {}", params.auth.token),
            format!("Signature: {}", params.auth.signature),
            format!("Sub-Only: {}", yes_no(params.auth.sub_only)),
            format!("Privileged: {}", yes_no(params.auth.privileged)),
        ];

        for line in &lines {
            job.log(line);
        }
    }
}

/// Moves `job` to `next` and publishes the change.
pub(crate) fn advance(
    job: &DownloadJob,
    next: JobState,
    events: &broadcast::Sender<JobEvent>,
) -> Result<(), InvalidTransition> {
    let from = job.transition(next)?;
    debug!(job_id = %job.id(), %from, to = %next, "Job state changed");
    // no subscribers is fine
    let _ = events.send(JobEvent::JobStateChanged {
        id: job.id().to_string(),
        from,
        to: next,
    });
    Ok(())
}
