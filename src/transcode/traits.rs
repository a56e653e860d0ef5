//! Transcoder trait abstraction

use crate::error::TranscodeError;
use std::path::Path;

/// Audio transcoding backend
pub trait Transcoder: Send + Sync {
    /// Transcode `source` into `dest`, blocking until done
    ///
    /// # Arguments
    /// * `source` - Path to the source audio file
    /// * `dest` - Path of the compressed file to write
    /// * `quality` - Backend-specific quality/compression setting
    fn transcode(&self, source: &Path, dest: &Path, quality: &str) -> Result<(), TranscodeError>;

    /// Get the name of this transcoder (for logging)
    fn name(&self) -> &str;
}
