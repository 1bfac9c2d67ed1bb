//! FFmpeg-based converter implementation.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::ConversionJob;
use crate::metrics;
use crate::progress::ProgressSink;

static TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"time\s*=\s*(\S+)").unwrap());

static TIMESTAMP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):([0-5]?\d):([0-5]?\d(?:\.\d+)?)$").unwrap());

/// Builds the encoder argument list for a job.
pub fn build_args(config: &ConverterConfig, job: &ConversionJob) -> Vec<String> {
    let mut args = vec!["-y".to_string()];

    if job.window.trim_start {
        args.extend(["-ss".to_string(), job.window.start_offset_secs.to_string()]);
    }

    args.extend([
        "-i".to_string(),
        job.input_path.to_string_lossy().to_string(),
        "-analyzeduration".to_string(),
        config.analyze_duration.to_string(),
        "-probesize".to_string(),
        config.probe_size.to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
    ]);

    if job.window.trim_end {
        args.extend(["-t".to_string(), job.window.total_length_secs.to_string()]);
    }

    args.push(job.output_path.to_string_lossy().to_string());
    args
}

/// Extracts the encoder position from a `frame=` status line.
///
/// Returns `None` when the line has no `time=` field or the value is not an
/// `HH:MM:SS(.frac)` timestamp (ffmpeg prints `N/A` before the first frame).
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let value = TIME_REGEX.captures(line)?.get(1)?.as_str();
    let caps = TIMESTAMP_REGEX.captures(value)?;

    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Fixed-capacity buffer of the most recent encoder output lines.
#[derive(Debug, Clone)]
pub struct LogTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends a line, evicting the oldest one when full.
    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.lines.into()
    }
}

/// Splits `chunk` on `\r` and `\n`, carrying incomplete input over in `pending`.
///
/// ffmpeg terminates its status line with a bare carriage return, so both are
/// treated as line breaks.
fn split_lines(pending: &mut Vec<u8>, chunk: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    for &byte in chunk {
        if byte == b'\r' || byte == b'\n' {
            if !pending.is_empty() {
                lines.push(String::from_utf8_lossy(pending).into_owned());
                pending.clear();
            }
        } else {
            pending.push(byte);
        }
    }
    lines
}

/// Forwards every line read from `reader` into `tx` until EOF.
async fn forward_lines<R>(mut reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4096];
    let mut pending = Vec::new();

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!(error = %e, "Encoder output stream closed with error");
                break;
            }
        };
        for line in split_lines(&mut pending, &buf[..n]) {
            if tx.send(line).is_err() {
                return;
            }
        }
    }

    if !pending.is_empty() {
        let _ = tx.send(String::from_utf8_lossy(&pending).into_owned());
    }
}

/// FFmpeg-based converter implementation.
pub struct FfmpegConverter {
    config: ConverterConfig,
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    async fn ensure_output_dir(
        &self,
        output_path: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<(), ConverterError> {
        let Some(parent) = output_path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() || tokio::fs::try_exists(parent).await.unwrap_or(false)
        {
            return Ok(());
        }

        sink.log("");
        sink.log(&format!("Creating output directory '{}'...", parent.display()));
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ConverterError::OutputDirectoryFailed {
                path: PathBuf::from(parent),
                source,
            })?;
        sink.log("done!");
        Ok(())
    }

    fn spawn(&self, args: &[String]) -> Result<Child, ConverterError> {
        Command::new(&self.config.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConverterError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    ConverterError::Io(e)
                }
            })
    }

    /// Consumes encoder output until both streams close, then waits for exit.
    async fn supervise(
        &self,
        child: &mut Child,
        total_length_secs: f64,
        tail: &mut LogTail,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<ExitStatus, ConverterError> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ConverterError::Cancelled),
                line = rx.recv() => {
                    let Some(line) = line else { break };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    tail.push(line.to_string());

                    if total_length_secs > 0.0 && starts_with_ignore_case(line, "frame") {
                        match parse_progress_time(line) {
                            Some(current) => {
                                sink.set_indeterminate(false);
                                sink.set_progress(current / total_length_secs * 100.0);
                            }
                            None => sink.set_indeterminate(true),
                        }
                    }
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(ConverterError::Cancelled),
            status = child.wait() => Ok(status?),
        }
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn convert(
        &self,
        job: &ConversionJob,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<(), ConverterError> {
        sink.set_status("Converting Video");
        sink.set_indeterminate(true);

        self.ensure_output_dir(&job.output_path, sink).await?;

        let args = build_args(&self.config, job);

        sink.log("");
        sink.log(&format!(
            "Executing '{}' on '{}'...",
            self.config.ffmpeg_path.display(),
            job.input_path.display()
        ));
        sink.log(&format!("Command line arguments: {}", args.join(" ")));

        info!(
            job_id = %job.job_id,
            input = %job.input_path.display(),
            output = %job.output_path.display(),
            "Starting conversion"
        );

        let mut child = self.spawn(&args)?;
        let mut tail = LogTail::new(self.config.log_tail_lines);

        let status = match self
            .supervise(&mut child, job.window.total_length_secs, &mut tail, cancel, sink)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                if let Err(kill_err) = child.kill().await {
                    debug!(error = %kill_err, "Failed to kill encoder");
                }
                if e.is_cancelled() {
                    info!(job_id = %job.job_id, "Conversion cancelled");
                }
                return Err(e);
            }
        };

        if status.success() {
            sink.log("");
            sink.log("Video conversion complete!");
            info!(job_id = %job.job_id, "Conversion complete");
            return Ok(());
        }

        metrics::CONVERSION_FAILURES.inc();
        warn!(
            job_id = %job.job_id,
            exit_code = ?status.code(),
            "Encoder exited with failure"
        );

        let tail = tail.into_vec();
        for line in &tail {
            sink.log(line);
        }

        Err(ConverterError::conversion_failed(status.code(), tail))
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConverterError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                })
            }
            Err(e) => Err(ConverterError::Io(e)),
        }
    }
}
