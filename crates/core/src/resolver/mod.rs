//! Playlist resolver: finds and downloads the media playlist of a video.
//!
//! [`UsherResolver`] requests the master playlist listing every quality,
//! picks the variant whose URL contains `/<quality id>/`, and downloads it.
//!
//! # Example
//!
//! ```ignore
//! use vodpipe_core::resolver::{PlaylistResolver, ResolverConfig, UsherResolver};
//!
//! let resolver = UsherResolver::from_config(ResolverConfig::default())?;
//! let url = resolver.resolve_playlist_url("123456", &quality, &auth).await?;
//! let manifest = resolver.fetch_manifest(&url).await?;
//! ```

mod config;
mod error;
mod traits;
mod usher;

pub use config::ResolverConfig;
pub use error::ResolverError;
pub use traits::PlaylistResolver;
pub use usher::{select_quality_url, UsherResolver};
