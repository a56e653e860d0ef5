//! Pipeline orchestration
//!
//! Phase 1 transcodes audio, phase 2 copies cover art. Phase 2 only starts
//! once every phase 1 job has finished, because it relies on the album
//! directories phase 1 creates.

use super::pool::{PhaseReport, WorkerPool};
use crate::config::Settings;
use crate::discovery::{self, MatchRule};
use crate::error::Result;
use crate::mirror::{CoverArtWorker, Job, JobKind, TranscodeWorker};
use crate::transcode::{SoxTranscoder, Transcoder};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summary of a mirror run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    pub transcode: PhaseReport,
    /// `None` when the cover art phase was disabled
    pub cover_art: Option<PhaseReport>,
}

impl MirrorReport {
    /// Jobs that failed across both phases
    pub fn failed(&self) -> usize {
        self.transcode.failed + self.cover_art.map_or(0, |r| r.failed)
    }
}

/// Run a full mirror using the transcoder named in `settings`
///
/// The transcoder is located before any discovery happens, so a missing
/// binary fails the run without touching the filesystem.
pub fn run(settings: &Settings) -> Result<MirrorReport> {
    let transcoder = SoxTranscoder::locate(&settings.transcoder, settings.transcode_timeout)?;
    info!("Using transcoder {}", transcoder.binary().display());
    run_with(settings, &transcoder)
}

/// Run a full mirror with an explicit transcoder backend
pub fn run_with(settings: &Settings, transcoder: &dyn Transcoder) -> Result<MirrorReport> {
    let pipeline_start = Instant::now();
    let pool = WorkerPool::new(settings.threads, settings.show_progress)?;

    if settings.dry_run {
        info!("Dry run: nothing will be written to {}", settings.dest_dir.display());
    }

    let (transcode, planned_dirs) = transcode_phase(settings, transcoder, &pool)?;

    // Pruning destination files missing from the source would run here, as
    // its own phase between transcoding and cover art.

    let cover_art = if settings.cover_art {
        Some(cover_art_phase(settings, &pool, planned_dirs.as_ref())?)
    } else {
        debug!("Cover art phase disabled");
        None
    };

    info!(
        "Total mirror time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(MirrorReport {
        transcode,
        cover_art,
    })
}

/// Phase 1: discover audio and transcode stale files
///
/// In a dry run, also returns the directories the phase would have created.
fn transcode_phase(
    settings: &Settings,
    transcoder: &dyn Transcoder,
    pool: &WorkerPool,
) -> Result<(PhaseReport, Option<HashSet<PathBuf>>)> {
    let profile = &settings.profile;

    info!("Discovering audio files in {}...", settings.source_dir.display());
    let discovery_start = Instant::now();
    let files = discovery::discover(
        &settings.source_dir,
        MatchRule::Extensions(&profile.source_extensions),
    )?;
    info!(
        "Found {} audio files in {:.2}s",
        files.len(),
        discovery_start.elapsed().as_secs_f64()
    );

    let worker = TranscodeWorker::new(profile, transcoder, settings.dry_run);
    let jobs = Job::for_files(&settings.source_dir, &settings.dest_dir, files);
    let (jobs, collisions) = drop_colliding_jobs(jobs, &worker);

    // create_dir_all makes every ancestor, not just the album directory
    let planned_dirs = if settings.dry_run {
        Some(
            jobs.iter()
                .filter_map(|job| worker.destination(job).ok())
                .flat_map(|dest| {
                    dest.ancestors()
                        .skip(1)
                        .take_while(|dir| dir.starts_with(&settings.dest_dir))
                        .map(PathBuf::from)
                        .collect::<Vec<_>>()
                })
                .collect(),
        )
    } else {
        None
    };

    info!(
        "Transcoding audio with {} on {} threads...",
        transcoder.name(),
        pool.threads()
    );
    let phase_start = Instant::now();
    let mut report = pool.run(JobKind::Transcode, &jobs, |job| worker.run(job))?;
    report.total += collisions;
    report.skipped += collisions;
    log_phase(JobKind::Transcode, &report, phase_start);

    Ok((report, planned_dirs))
}

/// Keep one job per destination file
///
/// `song.flac` and `song.mp3` in one album both map to `song.ogg`; running
/// both would race on the same output. Jobs arrive in path order, so the
/// first source wins. Returns the surviving jobs and the number dropped.
fn drop_colliding_jobs(jobs: Vec<Job>, worker: &TranscodeWorker<'_>) -> (Vec<Job>, usize) {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut dropped = 0;

    let kept = jobs
        .into_iter()
        .filter(|job| {
            let Ok(dest) = worker.destination(job) else {
                return true;
            };
            match claimed.get(&dest) {
                Some(winner) => {
                    warn!(
                        "Skipping {}: {} already maps to {}",
                        job.source_file.display(),
                        winner.display(),
                        dest.display()
                    );
                    dropped += 1;
                    false
                }
                None => {
                    claimed.insert(dest, job.source_file.clone());
                    true
                }
            }
        })
        .collect();

    (kept, dropped)
}

/// Phase 2: copy cover art into album directories that exist in the mirror
fn cover_art_phase(
    settings: &Settings,
    pool: &WorkerPool,
    planned_dirs: Option<&HashSet<PathBuf>>,
) -> Result<PhaseReport> {
    info!("Discovering cover art files in {}...", settings.source_dir.display());
    let files = discovery::discover(
        &settings.source_dir,
        MatchRule::FileNames(&settings.profile.cover_art_names),
    )?;
    info!("Found {} cover art files", files.len());

    let jobs = Job::for_files(&settings.source_dir, &settings.dest_dir, files);
    let mut worker = CoverArtWorker::new(settings.dry_run);
    if let Some(dirs) = planned_dirs {
        worker = worker.with_planned_dirs(dirs);
    }

    info!("Copying album art...");
    let phase_start = Instant::now();
    let report = pool.run(JobKind::Copy, &jobs, |job| worker.run(job))?;
    log_phase(JobKind::Copy, &report, phase_start);

    Ok(report)
}

fn log_phase(kind: JobKind, report: &PhaseReport, started: Instant) {
    info!(
        "{} finished in {:.2}s: {} written, {} up to date, {} skipped, {} failed",
        kind.label(),
        started.elapsed().as_secs_f64(),
        report.written,
        report.up_to_date,
        report.skipped,
        report.failed
    );
}
