//! Trimming a playlist to a requested time window.

use serde::{Deserialize, Serialize};

use super::types::Playlist;

/// Requested trim window, as entered by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropSpec {
    /// Cut the beginning of the video.
    #[serde(default)]
    pub trim_start: bool,
    /// Start of the window in seconds (ignored unless `trim_start`).
    #[serde(default)]
    pub start_secs: f64,
    /// Cut the end of the video.
    #[serde(default)]
    pub trim_end: bool,
    /// End of the window in seconds (ignored unless `trim_end`).
    #[serde(default)]
    pub end_secs: f64,
}

impl CropSpec {
    /// No trimming for a video of `video_length_secs`.
    pub fn none(video_length_secs: f64) -> Self {
        Self {
            trim_start: false,
            start_secs: 0.0,
            trim_end: false,
            end_secs: video_length_secs,
        }
    }

    /// Fills in the untrimmed boundaries: start 0 and end = video length.
    pub fn resolve(&self, video_length_secs: f64) -> Self {
        Self {
            trim_start: self.trim_start,
            start_secs: if self.trim_start { self.start_secs } else { 0.0 },
            trim_end: self.trim_end,
            end_secs: if self.trim_end {
                self.end_secs
            } else {
                video_length_secs
            },
        }
    }

    /// Why this window cannot be cut, if it cannot.
    pub fn invalid_reason(&self) -> Option<&'static str> {
        if self.trim_start && !(self.start_secs.is_finite() && self.start_secs >= 0.0) {
            return Some("crop start must be a non-negative number of seconds");
        }
        if self.trim_end && !(self.end_secs.is_finite() && self.end_secs > 0.0) {
            return Some("crop end must be a positive number of seconds");
        }
        if self.trim_start && self.trim_end && self.end_secs <= self.start_secs {
            return Some("crop end must be after crop start");
        }
        None
    }

    /// Length of the resulting video in seconds.
    pub fn cropped_length(&self, video_length_secs: f64) -> f64 {
        match (self.trim_start, self.trim_end) {
            (false, false) => video_length_secs,
            (false, true) => self.end_secs,
            (true, false) => video_length_secs - self.start_secs,
            (true, true) => self.end_secs - self.start_secs,
        }
    }
}

/// Trim window handed to the encoder after the playlist has been cropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropWindow {
    pub trim_start: bool,
    pub trim_end: bool,
    /// Offset into the first retained segment, in seconds.
    pub start_offset_secs: f64,
    /// Length of the output, in seconds.
    pub total_length_secs: f64,
}

impl CropWindow {
    /// Untrimmed window of the given length.
    pub fn full(total_length_secs: f64) -> Self {
        Self {
            trim_start: false,
            trim_end: false,
            start_offset_secs: 0.0,
            total_length_secs: round_millis(total_length_secs),
        }
    }
}

/// Drops the segments outside of `spec` from `playlist` and returns the
/// window the encoder still has to cut.
///
/// `spec` must carry concrete boundaries (see [`CropSpec::resolve`]).
/// Leading segments that end strictly before the start are dropped; trailing
/// segments whose start is at or after the end are dropped. A segment
/// starting exactly at the end boundary is therefore removed.
pub fn apply_crop(playlist: &mut Playlist, spec: &CropSpec) -> CropWindow {
    let mut start = spec.start_secs;
    let end = round_millis(spec.end_secs);
    let length = round_millis(if spec.trim_start {
        spec.end_secs - spec.start_secs
    } else {
        spec.end_secs
    });
    start = round_millis(start);

    let mut remove = vec![false; playlist.len()];

    if spec.trim_start {
        let mut sum = 0.0;
        for (idx, segment) in playlist.iter().enumerate() {
            if sum + segment.duration_secs < start {
                sum += segment.duration_secs;
                remove[idx] = true;
            } else {
                break;
            }
        }
        start = round_millis(start - sum);
    }

    if spec.trim_end {
        let mut sum = 0.0;
        for (idx, segment) in playlist.iter().enumerate() {
            if sum >= end {
                remove[idx] = true;
            }
            sum += segment.duration_secs;
        }
    }

    playlist.remove_flagged(&remove);

    CropWindow {
        trim_start: spec.trim_start,
        trim_end: spec.trim_end,
        start_offset_secs: if spec.trim_start { start } else { 0.0 },
        total_length_secs: length,
    }
}

fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}
