//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// musicmirror - Keep a lossy copy of your music library in sync
///
/// Transcodes every audio file under SOURCE_DIR into a matching tree under
/// DEST_DIR, skipping files whose copy is already up to date, then copies
/// cover art into the mirrored album directories.
#[derive(Parser, Debug)]
#[command(name = "musicmirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source music library path
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Destination music library path
    #[arg(value_name = "DEST_DIR")]
    pub dest_dir: PathBuf,

    /// Number of threads to transcode and copy with (defaults to CPU count)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Disable copying of cover art. Existing cover art is not deleted
    #[arg(long, default_value = "false")]
    pub no_cover_art: bool,

    /// Transcoder binary name or path
    #[arg(long, value_name = "BIN", default_value = "sox")]
    pub transcoder: String,

    /// Kill a transcode that runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (warnings only, no progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - report what would be transcoded or copied without writing anything
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log filter based on verbosity flags
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
