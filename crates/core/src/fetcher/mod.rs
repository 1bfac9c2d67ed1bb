//! Segment fetcher: downloads every segment of a playlist.
//!
//! Segments are downloaded concurrently, bounded by
//! [`FetcherConfig::max_parallel`], each with a fixed retry budget and a fixed
//! delay between attempts. The network side is abstracted by
//! [`SegmentTransport`]; [`HttpTransport`] is the reqwest implementation.

mod config;
mod error;
mod http;
mod segment_fetcher;
mod traits;

pub use config::FetcherConfig;
pub use error::{FetchError, TransportError};
pub use http::HttpTransport;
pub use segment_fetcher::{FetchSummary, SegmentFetcher};
pub use traits::SegmentTransport;
