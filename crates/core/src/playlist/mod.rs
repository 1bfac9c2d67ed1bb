//! Segmented media playlists.
//!
//! A VOD is served as a media manifest listing its segments in playback
//! order. This module parses such a manifest into a [`Playlist`] and trims it
//! to a requested time window with [`apply_crop`].
//!
//! # Example
//!
//! ```ignore
//! use vodpipe_core::playlist::{apply_crop, parse, url_prefix_of, CropSpec};
//!
//! let url = "https://cdn.example/vod/chunked/index-dvr.m3u8";
//! let mut playlist = parse(&temp_dir, &manifest, url_prefix_of(url))?;
//!
//! let window = apply_crop(&mut playlist, &CropSpec::none(video_length_secs));
//! ```

mod crop;
mod parser;
mod types;

pub use crop::{apply_crop, CropSpec, CropWindow};
pub use parser::{parse, url_prefix_of, PlaylistError};
pub use types::{Playlist, Segment};
