//! Converter module: remuxes the concatenated stream with an external encoder.
//!
//! The encoder is treated as a black box with a fixed argument contract:
//!
//! ```text
//! ffmpeg -y [-ss <start>] -i <input> -analyzeduration N -probesize N -c:v copy [-t <length>] <output>
//! ```
//!
//! Its merged stdout/stderr is scanned for `frame=... time=HH:MM:SS.ff` lines to
//! drive progress; the last lines are kept and dumped into the job log when the
//! encoder fails.
//!
//! # Example
//!
//! ```ignore
//! use vodpipe_core::converter::{ConversionJob, Converter, FfmpegConverter};
//! use vodpipe_core::playlist::CropWindow;
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let job = ConversionJob::new(
//!     "job-1",
//!     "/tmp/vodpipe/TL_job-1/stream.ts",
//!     "/videos/stream.mp4",
//!     CropWindow::full(3600.0),
//! );
//! converter.convert(&job, &cancel, &sink).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::{build_args, parse_progress_time, FfmpegConverter, LogTail};
pub use traits::Converter;
pub use types::ConversionJob;
