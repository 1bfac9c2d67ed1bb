//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits, so
//! that whole pipelines can run without network access or an encoder.
//!
//! # Example
//!
//! ```rust,ignore
//! use vodpipe_core::testing::{fixtures, MockConverter, MockResolver, MockTransport};
//!
//! let resolver = MockResolver::new();
//! resolver.set_manifest("v1", "chunked", fixtures::manifest(3, 10.0));
//!
//! let transport = MockTransport::new();
//! fixtures::serve_segments(&transport, &resolver.playlist_url("v1", "chunked"), 3);
//! ```

mod mock_converter;
mod mock_resolver;
mod mock_transport;
mod recording_sink;

pub use mock_converter::MockConverter;
pub use mock_resolver::MockResolver;
pub use mock_transport::MockTransport;
pub use recording_sink::RecordingSink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;

    use super::MockTransport;
    use crate::job::{DownloadParameters, Quality, VideoRef, VodAuth};
    use crate::playlist::{url_prefix_of, CropSpec};

    /// Download parameters for `video_id` at the `chunked` quality.
    pub fn sample_params(video_id: &str) -> DownloadParameters {
        DownloadParameters {
            video: VideoRef {
                id: video_id.to_string(),
                url: format!("https://example.com/videos/{}", video_id),
                length_secs: 30.0,
            },
            quality: Quality {
                id: "chunked".to_string(),
                display_name: "Source".to_string(),
            },
            auth: VodAuth {
                token: "token".to_string(),
                signature: "signature".to_string(),
                sub_only: false,
                privileged: false,
            },
            folder: PathBuf::from("/videos"),
            filename: format!("{}.mp4", video_id),
            crop: CropSpec::default(),
            disable_conversion: false,
        }
    }

    /// Same as [`sample_params`] but writing into `folder`.
    pub fn params_in(video_id: &str, folder: impl Into<PathBuf>) -> DownloadParameters {
        DownloadParameters {
            folder: folder.into(),
            ..sample_params(video_id)
        }
    }

    /// Media playlist with `count` segments named `0.ts`, `1.ts`, ...
    pub fn manifest(count: usize, duration_secs: f64) -> String {
        let mut out = String::from("#EXTM3U\n#EXT-X-TARGETDURATION:10\n");
        for i in 0..count {
            out.push_str(&format!("#EXTINF:{:.3},\n{}.ts\n", duration_secs, i));
        }
        out.push_str("#EXT-X-ENDLIST\n");
        out
    }

    /// Body served for segment `index`.
    pub fn segment_body(index: usize) -> String {
        format!("<segment {}>", index)
    }

    /// Serves the segments of [`manifest`] relative to `playlist_url`.
    pub fn serve_segments(transport: &MockTransport, playlist_url: &str, count: usize) {
        let prefix = url_prefix_of(playlist_url);
        for i in 0..count {
            transport.set_response(format!("{}{}.ts", prefix, i), segment_body(i));
        }
    }

    /// Concatenation of the first `count` segment bodies.
    pub fn expected_output(count: usize) -> String {
        (0..count).map(segment_body).collect()
    }
}
