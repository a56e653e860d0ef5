//! Unit of work for a mirror phase

use crate::error::{MirrorError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The two kinds of work a mirror run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Audio file, re-encoded into the output format
    Transcode,
    /// Cover art, copied byte for byte
    Copy,
}

impl JobKind {
    /// Human readable phase name (for logging)
    pub fn label(self) -> &'static str {
        match self {
            JobKind::Transcode => "Transcoding audio",
            JobKind::Copy => "Copying cover art",
        }
    }
}

/// One source file to mirror
///
/// Roots are shared between all jobs of a run.
#[derive(Debug, Clone)]
pub struct Job {
    pub source_root: Arc<Path>,
    pub dest_root: Arc<Path>,
    pub source_file: PathBuf,
}

impl Job {
    /// Build one job per discovered file
    pub fn for_files(source_root: &Path, dest_root: &Path, files: BTreeSet<PathBuf>) -> Vec<Job> {
        let source_root: Arc<Path> = Arc::from(source_root);
        let dest_root: Arc<Path> = Arc::from(dest_root);
        files
            .into_iter()
            .map(|source_file| Job {
                source_root: Arc::clone(&source_root),
                dest_root: Arc::clone(&dest_root),
                source_file,
            })
            .collect()
    }

    /// Destination of this job's output
    ///
    /// The source root prefix is swapped for the destination root, and the
    /// extension replaced when `extension` is given.
    pub fn destination(&self, extension: Option<&str>) -> Result<PathBuf> {
        let relative = self.source_file.strip_prefix(&self.source_root).map_err(|_| {
            MirrorError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "{} is not under {}",
                    self.source_file.display(),
                    self.source_root.display()
                ),
            ))
        })?;

        let dest = self.dest_root.join(relative);
        Ok(match extension {
            Some(ext) => dest.with_extension(ext),
            None => dest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(file: &str) -> Job {
        Job::for_files(
            Path::new("/music/flac"),
            Path::new("/music/ogg"),
            [PathBuf::from(file)].into_iter().collect(),
        )
        .remove(0)
    }

    #[test]
    fn test_destination_rewrites_extension() {
        let dest = job("/music/flac/Artist/Album/01 Intro.flac")
            .destination(Some("ogg"))
            .unwrap();
        assert_eq!(dest, PathBuf::from("/music/ogg/Artist/Album/01 Intro.ogg"));
    }

    #[test]
    fn test_destination_replaces_only_last_extension() {
        let dest = job("/music/flac/A/live.2019.mp3")
            .destination(Some("ogg"))
            .unwrap();
        assert_eq!(dest, PathBuf::from("/music/ogg/A/live.2019.ogg"));
    }

    #[test]
    fn test_destination_keeps_extension_for_copies() {
        let dest = job("/music/flac/A/cover.jpg").destination(None).unwrap();
        assert_eq!(dest, PathBuf::from("/music/ogg/A/cover.jpg"));
        assert!(dest.starts_with("/music/ogg"));
    }

    #[test]
    fn test_destination_outside_root_fails() {
        assert!(job("/elsewhere/song.flac").destination(None).is_err());
    }

    #[test]
    fn test_jobs_share_roots() {
        let jobs = Job::for_files(
            Path::new("/src"),
            Path::new("/dst"),
            ["/src/a.flac", "/src/b.flac"].iter().map(PathBuf::from).collect(),
        );
        assert_eq!(jobs.len(), 2);
        assert!(Arc::ptr_eq(&jobs[0].dest_root, &jobs[1].dest_root));
    }
}
