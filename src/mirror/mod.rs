//! Per-file mirroring: jobs, the staleness rule and the two workers

pub mod job;
pub mod staleness;
pub mod worker;

pub use job::{Job, JobKind};
pub use staleness::needs_update;
pub use worker::{CoverArtWorker, JobOutcome, TranscodeWorker};
