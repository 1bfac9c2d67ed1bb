//! Trait definitions for the converter module.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::error::ConverterError;
use super::types::ConversionJob;
use crate::progress::ProgressSink;

/// A converter that remuxes the concatenated stream into the final output.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Runs the conversion, reporting status and progress to `sink`.
    ///
    /// Returns [`ConverterError::Cancelled`] if `cancel` trips while the
    /// encoder is running.
    async fn convert(
        &self,
        job: &ConversionJob,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<(), ConverterError>;

    /// Validates that the converter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}
