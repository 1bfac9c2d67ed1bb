//! Mock converter for testing.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::converter::{ConversionJob, Converter, ConverterError};
use crate::progress::ProgressSink;

/// Mock implementation of the Converter trait.
///
/// Copies the input file to the output path instead of running an encoder,
/// and records every job it was given.
#[derive(Debug, Default)]
pub struct MockConverter {
    conversions: Mutex<Vec<ConversionJob>>,
    next_error: Mutex<Option<ConverterError>>,
    delay: Mutex<Duration>,
}

impl MockConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next conversion with `error`.
    pub fn set_next_error(&self, error: ConverterError) {
        *self.next_error.lock() = Some(error);
    }

    /// Makes every conversion take at least `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Jobs submitted so far.
    pub fn recorded_conversions(&self) -> Vec<ConversionJob> {
        self.conversions.lock().clone()
    }

    pub fn conversion_count(&self) -> usize {
        self.conversions.lock().len()
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(
        &self,
        job: &ConversionJob,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<(), ConverterError> {
        self.conversions.lock().push(job.clone());
        sink.set_status("Converting Video");

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ConverterError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if let Some(error) = self.next_error.lock().take() {
            return Err(error);
        }

        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&job.input_path, &job.output_path).await?;

        sink.set_progress(100.0);
        sink.log("Video conversion complete!");
        Ok(())
    }
}
