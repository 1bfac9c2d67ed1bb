//! Types for the converter module.

use std::path::PathBuf;

use crate::playlist::CropWindow;

/// A remux job: one concatenated transport stream into the final output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    /// Download job this conversion belongs to.
    pub job_id: String,
    /// Concatenated input file.
    pub input_path: PathBuf,
    /// Final output file.
    pub output_path: PathBuf,
    /// Crop offsets computed from the playlist.
    pub window: CropWindow,
}

impl ConversionJob {
    pub fn new(
        job_id: impl Into<String>,
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        window: CropWindow,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            window,
        }
    }
}
