//! Download request types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::playlist::CropSpec;

/// The remote video being downloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Remote video identifier.
    pub id: String,
    /// Public page URL, informational only.
    #[serde(default)]
    pub url: String,
    /// Full length of the video in seconds.
    pub length_secs: f64,
}

/// A stream quality offered by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    /// Identifier as it appears in playlist URLs (`chunked`, `720p60`, ...).
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
}

impl Quality {
    /// Display name, falling back to the id.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }
}

/// Access token for one video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VodAuth {
    pub token: String,
    pub signature: String,
    #[serde(default)]
    pub sub_only: bool,
    #[serde(default)]
    pub privileged: bool,
}

/// Everything needed to download one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadParameters {
    pub video: VideoRef,
    pub quality: Quality,
    pub auth: VodAuth,
    /// Directory the output file is written to.
    pub folder: PathBuf,
    /// Output file name including extension.
    pub filename: String,
    #[serde(default)]
    pub crop: CropSpec,
    /// Keep the concatenated stream as the final output.
    #[serde(default)]
    pub disable_conversion: bool,
}

impl DownloadParameters {
    /// Output file path (`folder/filename`).
    pub fn full_path(&self) -> PathBuf {
        self.folder.join(&self.filename)
    }

    /// Output file name without its extension.
    pub fn output_stem(&self) -> String {
        Path::new(&self.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.clone())
    }

    /// Length of the requested range in seconds.
    pub fn cropped_length_secs(&self) -> f64 {
        self.crop.cropped_length(self.video.length_secs)
    }
}
