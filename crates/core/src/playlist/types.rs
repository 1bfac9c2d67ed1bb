//! Segment and playlist types.

use std::path::{Path, PathBuf};

/// One media segment of a VOD.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Playback duration in seconds (never negative).
    pub duration_secs: f64,
    /// Absolute URI the segment is fetched from.
    pub remote_uri: String,
    /// Where the downloaded bytes are written.
    pub local_path: PathBuf,
}

impl Segment {
    pub fn new(duration_secs: f64, remote_uri: impl Into<String>, local_path: PathBuf) -> Self {
        Self {
            duration_secs: duration_secs.max(0.0),
            remote_uri: remote_uri.into(),
            local_path,
        }
    }

    /// Local file name for the segment at `index` inside `dir`.
    pub fn local_path_for(dir: &Path, index: usize) -> PathBuf {
        dir.join(format!("{:08}.ts", index))
    }
}

/// Ordered segment list. Order is playback order and defines the
/// byte order of the concatenated output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playlist {
    segments: Vec<Segment>,
}

impl Playlist {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Removes the segments whose indices are flagged in `remove`.
    pub(crate) fn remove_flagged(&mut self, remove: &[bool]) {
        let mut idx = 0;
        self.segments.retain(|_| {
            let keep = !remove.get(idx).copied().unwrap_or(false);
            idx += 1;
            keep
        });
    }
}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}
