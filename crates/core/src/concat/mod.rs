//! Concatenator: joins downloaded segments into one transport stream.
//!
//! Segments are appended strictly in playlist order. Each segment file is
//! deleted as soon as it has been copied, so disk usage stays close to the
//! size of the output.

mod error;
mod merge;

pub use error::ConcatError;
pub use merge::concat_segments;
