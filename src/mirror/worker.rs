//! Transcode and cover art workers
//!
//! Each worker handles one job at a time and shares nothing mutable with its
//! siblings, so the pool may run them in any order.

use super::job::Job;
use super::staleness::needs_update;
use crate::config::MirrorProfile;
use crate::error::{MirrorError, Result};
use crate::transcode::Transcoder;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What a worker did with a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Destination was (or in a dry run, would be) written
    Written,
    /// Destination is already up to date
    UpToDate,
    /// Job was not applicable (cover art for an album that was never mirrored)
    Skipped,
}

/// Maps audio files to their transcoded destination and runs the transcoder
pub struct TranscodeWorker<'a> {
    profile: &'a MirrorProfile,
    transcoder: &'a dyn Transcoder,
    dry_run: bool,
}

impl<'a> TranscodeWorker<'a> {
    pub fn new(profile: &'a MirrorProfile, transcoder: &'a dyn Transcoder, dry_run: bool) -> Self {
        Self {
            profile,
            transcoder,
            dry_run,
        }
    }

    /// Destination of a transcode job
    pub fn destination(&self, job: &Job) -> Result<PathBuf> {
        job.destination(Some(&self.profile.output_extension))
    }

    pub fn run(&self, job: &Job) -> Result<JobOutcome> {
        let source = &job.source_file;
        let dest = self.destination(job)?;

        if !self.dry_run {
            if let Some(parent) = dest.parent() {
                // create_dir_all treats a directory created concurrently by a sibling as success
                fs::create_dir_all(parent).map_err(|e| MirrorError::output_error(parent, e))?;
            }
        }

        if !needs_update(source, &dest).map_err(|e| MirrorError::output_error(&dest, e))? {
            debug!("Skipping {} (not modified)", dest.display());
            return Ok(JobOutcome::UpToDate);
        }

        if self.dry_run {
            debug!("Would transcode: {} -> {}", source.display(), dest.display());
            return Ok(JobOutcome::Written);
        }

        debug!("Transcoding: {} -> {}", source.display(), dest.display());
        if let Err(e) = self
            .transcoder
            .transcode(source, &dest, &self.profile.quality)
        {
            discard_partial_output(&dest);
            return Err(MirrorError::Transcode {
                path: source.clone(),
                source: e,
            });
        }

        Ok(JobOutcome::Written)
    }
}

/// A failed transcoder may leave a truncated file newer than its source
fn discard_partial_output(dest: &Path) {
    match fs::remove_file(dest) {
        Ok(()) => debug!("Removed partial output {}", dest.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial output {}: {}", dest.display(), e),
    }
}

/// Copies cover art into album directories that already exist in the mirror
pub struct CoverArtWorker<'a> {
    dry_run: bool,
    /// Directories the transcode phase would have created during a dry run
    planned_dirs: Option<&'a HashSet<PathBuf>>,
}

impl<'a> CoverArtWorker<'a> {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            planned_dirs: None,
        }
    }

    /// Treat `dirs` as existing when deciding whether an album was mirrored
    pub fn with_planned_dirs(mut self, dirs: &'a HashSet<PathBuf>) -> Self {
        self.planned_dirs = Some(dirs);
        self
    }

    fn album_dir_exists(&self, dir: &Path) -> bool {
        dir.is_dir() || self.planned_dirs.is_some_and(|dirs| dirs.contains(dir))
    }

    pub fn run(&self, job: &Job) -> Result<JobOutcome> {
        let source = &job.source_file;
        let dest = job.destination(None)?;

        // Never create directories here: art only follows albums that were transcoded
        if !dest.parent().is_some_and(|dir| self.album_dir_exists(dir)) {
            debug!("Skipping {} (album not mirrored)", dest.display());
            return Ok(JobOutcome::Skipped);
        }

        if !needs_update(source, &dest).map_err(|e| MirrorError::copy_error(source, e))? {
            debug!("Skipping {} (not modified)", dest.display());
            return Ok(JobOutcome::UpToDate);
        }

        if self.dry_run {
            debug!("Would copy: {} -> {}", source.display(), dest.display());
            return Ok(JobOutcome::Written);
        }

        debug!("Copying: {} -> {}", source.display(), dest.display());
        copy_preserving_mtime(source, &dest).map_err(|e| MirrorError::copy_error(source, e))?;

        Ok(JobOutcome::Written)
    }
}

/// Copy contents and carry the source modification time over
///
/// The copy is staged next to `dest` and renamed into place, so a failure
/// never leaves a truncated file that looks newer than its source.
fn copy_preserving_mtime(source: &Path, dest: &Path) -> io::Result<()> {
    let staging = staging_path(dest);

    let result = write_staged(source, &staging).and_then(|()| fs::rename(&staging, dest));
    if result.is_err() {
        discard_partial_output(&staging);
    }
    result
}

fn write_staged(source: &Path, staging: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let modified = reader.metadata()?.modified()?;

    let mut writer = File::create(staging)?;
    io::copy(&mut reader, &mut writer)?;
    writer.set_modified(modified)
}

fn staging_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".musicmirror-partial");
    dest.with_file_name(name)
}
