//! Unified error types for musicmirror
//!
//! Error strategy:
//! - Per-job errors (transcode, copy): Recoverable, log and continue the phase
//! - Configuration and discovery errors: Fatal, abort before any work
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for musicmirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    // =========================================================================
    // Recoverable errors - count the job as failed, continue the phase
    // =========================================================================
    #[error("Failed to transcode '{path}': {source}")]
    Transcode {
        path: PathBuf,
        #[source]
        source: TranscodeError,
    },

    #[error("Failed to copy '{path}': {reason}\n  Tip: Check read access on the source and write access on the destination")]
    Copy { path: PathBuf, reason: String },

    #[error("Cannot write '{path}': {reason}\n  Tip: Check write permissions for the destination directory")]
    Output { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Fatal errors - abort the run before any filesystem mutation
    // =========================================================================
    #[error("Transcoder '{name}' was not found on PATH\n  Tip: Install it (e.g. `apt install sox libsox-fmt-all`) or pass --transcoder /path/to/binary")]
    TranscoderNotFound { name: String },

    #[error("Source directory does not exist: '{0}'\n  Tip: Check the path is correct and accessible")]
    SourceNotFound(PathBuf),

    #[error("Cannot read source directory '{path}': {reason}")]
    Discovery { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for musicmirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

impl MirrorError {
    /// Returns true if this error belongs to a single job (should be counted, not abort the run)
    pub fn is_job_error(&self) -> bool {
        matches!(
            self,
            MirrorError::Transcode { .. }
                | MirrorError::Copy { .. }
                | MirrorError::Output { .. }
                | MirrorError::Io(_)
        )
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("Directory does not exist: {}", path.parent().map(|p| p.display().to_string()).unwrap_or_default())
            }
            _ => err.to_string(),
        };
        MirrorError::Output { path, reason }
    }

    /// Create a copy error, translating common IO failures
    pub fn copy_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
            std::io::ErrorKind::NotFound => "Source vanished during the run".to_string(),
            _ => err.to_string(),
        };
        MirrorError::Copy { path, reason }
    }
}

/// Failure of the external transcoding collaborator
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("could not start '{binary}': {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{binary}' exited with {status}{}", format_stderr(.stderr))]
    Failed {
        binary: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("'{binary}' did not finish within {}s and was killed", .timeout.as_secs())]
    TimedOut { binary: PathBuf, timeout: Duration },

    #[error("IO error while waiting for transcoder: {0}")]
    Io(#[from] std::io::Error),
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}
