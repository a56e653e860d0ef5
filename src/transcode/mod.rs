//! Transcoding backends
//!
//! The mirror only needs one operation from a transcoder, so the backend is
//! swappable: `SoxTranscoder` shells out to `sox`, tests plug in fakes.

mod sox;
mod traits;

pub use sox::{locate_binary, SoxTranscoder};
pub use traits::Transcoder;
