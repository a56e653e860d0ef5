//! Two-phase mirror pipeline

mod orchestrator;
mod pool;

pub use orchestrator::{run, run_with, MirrorReport};
pub use pool::{PhaseReport, WorkerPool};
