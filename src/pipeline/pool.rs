//! Fixed-size worker pool for one mirror phase
//!
//! A fresh rayon pool is built per phase and dropped when the phase ends, so
//! every job of one phase has finished before the next phase starts.

use crate::error::{MirrorError, Result};
use crate::mirror::{Job, JobKind, JobOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error};

/// Counts for one completed phase
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhaseReport {
    pub total: usize,
    pub written: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Runs a homogeneous list of jobs on `threads` workers
#[derive(Debug, Clone)]
pub struct WorkerPool {
    threads: usize,
    show_progress: bool,
}

impl WorkerPool {
    pub fn new(threads: usize, show_progress: bool) -> Result<Self> {
        if threads == 0 {
            return Err(MirrorError::Config(
                "worker pool needs at least one thread".to_string(),
            ));
        }
        Ok(Self {
            threads,
            show_progress,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `worker` on every job and block until all have been attempted
    ///
    /// A failing or panicking job is logged and counted; it never stops its
    /// siblings.
    pub fn run<F>(&self, kind: JobKind, jobs: &[Job], worker: F) -> Result<PhaseReport>
    where
        F: Fn(&Job) -> Result<JobOutcome> + Sync,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("mirror-worker-{}", i))
            .build()
            .map_err(|e| MirrorError::Config(format!("Failed to build thread pool: {}", e)))?;
        debug!("{}: {} jobs on {} threads", kind.label(), jobs.len(), self.threads);

        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(jobs.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            Some(pb)
        } else {
            None
        };

        let written = AtomicUsize::new(0);
        let up_to_date = AtomicUsize::new(0);
        let skipped = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        pool.install(|| {
            jobs.par_iter().for_each(|job| {
                let result = panic::catch_unwind(AssertUnwindSafe(|| worker(job)));

                match result {
                    Ok(Ok(JobOutcome::Written)) => {
                        written.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(Ok(JobOutcome::UpToDate)) => {
                        up_to_date.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(Ok(JobOutcome::Skipped)) => {
                        skipped.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(Err(e)) if e.is_job_error() => {
                        error!("{}", e);
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(Err(e)) => {
                        error!(
                            "Unexpected error on {}: {}",
                            job.source_file.display(),
                            e
                        );
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(panic_info) => {
                        let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                            s.to_string()
                        } else if let Some(s) = panic_info.downcast_ref::<String>() {
                            s.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        error!(
                            "Worker panicked on {}: {}",
                            job.source_file.display(),
                            panic_msg
                        );
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }

                if let Some(ref pb) = progress_bar {
                    pb.inc(1);
                    pb.set_message(format!(
                        "{}",
                        job.source_file.file_name().unwrap_or_default().to_string_lossy()
                    ));
                }
            });
        });

        if let Some(pb) = progress_bar {
            pb.finish_with_message(format!("{} complete", kind.label()));
        }

        Ok(PhaseReport {
            total: jobs.len(),
            written: written.load(Ordering::Relaxed),
            up_to_date: up_to_date.load(Ordering::Relaxed),
            skipped: skipped.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
        })
    }
}
