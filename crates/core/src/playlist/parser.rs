//! Media manifest parser.

use std::path::Path;

use thiserror::Error;

use super::types::{Playlist, Segment};

/// Marker of a segment info line.
const SEGMENT_INFO_MARKER: &str = "#EXTINF";

/// Errors raised while parsing a media manifest.
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// The duration of a segment info line is not a decimal number.
    #[error("invalid segment duration '{value}' on line {line}")]
    InvalidDuration { line: usize, value: String },

    /// A segment info line is not followed by a URI line.
    #[error("segment info on line {line} has no URI")]
    MissingUri { line: usize },
}

/// Parses a media manifest into a [`Playlist`].
///
/// Every `#EXTINF` line yields one segment whose URI is the next line.
/// Relative URIs are prefixed with `url_prefix`. Local paths are
/// `temp_dir/00000000.ts`, `temp_dir/00000001.ts`, ... in encounter order.
pub fn parse(temp_dir: &Path, manifest: &str, url_prefix: &str) -> Result<Playlist, PlaylistError> {
    let lines: Vec<(usize, &str)> = manifest
        .split('\n')
        .map(|l| l.trim_end_matches('\r'))
        .enumerate()
        .filter(|(_, l)| !l.is_empty())
        .map(|(i, l)| (i + 1, l))
        .collect();

    let mut playlist = Playlist::default();
    let mut iter = lines.iter();

    while let Some(&(line_no, line)) = iter.next() {
        if !starts_with_ignore_case(line, SEGMENT_INFO_MARKER) {
            continue;
        }

        let duration = parse_duration(line).ok_or_else(|| PlaylistError::InvalidDuration {
            line: line_no,
            value: line.to_string(),
        })?;

        let &(_, uri) = iter
            .next()
            .ok_or(PlaylistError::MissingUri { line: line_no })?;

        let index = playlist.len();
        playlist.push(Segment::new(
            duration,
            resolve_uri(url_prefix, uri.trim()),
            Segment::local_path_for(temp_dir, index),
        ));
    }

    Ok(playlist)
}

/// Everything up to and including the last `/` of a playlist URL.
///
/// Relative segment URIs in a manifest are resolved against this prefix.
pub fn url_prefix_of(playlist_url: &str) -> &str {
    match playlist_url.rfind('/') {
        Some(idx) => &playlist_url[..=idx],
        None => "",
    }
}

fn parse_duration(line: &str) -> Option<f64> {
    let value = line.rsplit(':').next()?.trim().trim_end_matches(',').trim();
    value.parse::<f64>().ok().map(|d| d.max(0.0))
}

fn resolve_uri(url_prefix: &str, uri: &str) -> String {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        uri.to_string()
    } else {
        format!("{}{}", url_prefix, uri)
    }
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len() && line.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
