//! Runtime configuration settings

use super::profile::MirrorProfile;
use crate::error::{MirrorError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime settings for a mirror run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Source library root
    pub source_dir: PathBuf,
    /// Destination library root
    pub dest_dir: PathBuf,
    /// Worker pool size for both phases
    pub threads: usize,
    /// Run the cover art phase
    pub cover_art: bool,
    /// Transcoder binary name (looked up on PATH) or path
    pub transcoder: String,
    /// Per-file transcode time limit
    pub transcode_timeout: Option<Duration>,
    /// Report actions without touching the destination
    pub dry_run: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Matching rules and output format
    pub profile: MirrorProfile,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Result<Self> {
        let threads = cli.threads.unwrap_or_else(num_cpus::get);
        if threads == 0 {
            return Err(MirrorError::Config(
                "--threads must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            source_dir: absolute(&cli.source_dir)?,
            dest_dir: absolute(&cli.dest_dir)?,
            threads,
            cover_art: !cli.no_cover_art,
            transcoder: cli.transcoder.clone(),
            transcode_timeout: cli.timeout.map(Duration::from_secs),
            dry_run: cli.dry_run,
            show_progress: !cli.quiet,
            profile: MirrorProfile::default(),
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            dest_dir: PathBuf::from("./mirror"),
            threads: num_cpus::get().max(1),
            cover_art: true,
            transcoder: "sox".to_string(),
            transcode_timeout: None,
            dry_run: false,
            show_progress: true,
            profile: MirrorProfile::default(),
        }
    }
}

/// Make a path absolute without requiring it to exist
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| {
        MirrorError::Config(format!("Cannot resolve path '{}': {}", path.display(), e))
    })
}
