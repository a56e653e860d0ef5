//! musicmirror - Incremental lossy mirror of a music library
//!
//! Walks a source library, transcodes every audio file whose mirrored copy is
//! missing or older than the source, then copies cover art into the mirrored
//! album directories. Modification times in the destination tree are the only
//! state kept between runs.
//!
//! # Architecture
//!
//! - `config`: CLI argument parsing, runtime settings and the mirror profile
//! - `discovery`: Recursive file matching by extension or exact name
//! - `mirror`: Jobs, the staleness rule, and the transcode/cover art workers
//! - `transcode`: Swappable transcoder backends (`sox` subprocess by default)
//! - `pipeline`: Per-phase worker pool and two-phase orchestration
//!
//! # Example
//!
//! ```no_run
//! use musicmirror::{config::Settings, pipeline};
//!
//! let settings = Settings {
//!     source_dir: "/music/flac".into(),
//!     dest_dir: "/music/ogg".into(),
//!     ..Settings::default()
//! };
//! let report = pipeline::run(&settings).expect("Mirror failed");
//! println!("Transcoded {} files", report.transcode.written);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod mirror;
pub mod pipeline;
pub mod transcode;

// Re-export key types at crate root
pub use error::{MirrorError, Result, TranscodeError};
pub use pipeline::{MirrorReport, PhaseReport};
