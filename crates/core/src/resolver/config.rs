//! Configuration for the playlist resolver.

use serde::{Deserialize, Serialize};

/// Where and how master playlists are requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Master playlist URL. `{id}`, `{sig}` and `{token}` are substituted.
    #[serde(default = "default_playlists_url_template")]
    pub playlists_url_template: String,

    /// Value of the `Client-ID` header, omitted when empty.
    #[serde(default)]
    pub client_id: String,

    /// Timeout for playlist requests in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_playlists_url_template() -> String {
    "https://usher.ttvnw.net/vod/{id}.m3u8?nauthsig={sig}&nauth={token}\
     &allow_source=true&player=twitchweb&allow_spectre=true&allow_audio_only=true"
        .to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            playlists_url_template: default_playlists_url_template(),
            client_id: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}
