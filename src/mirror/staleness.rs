//! Modification-time based staleness check
//!
//! The destination tree's mtimes are the only state carried between runs.

use std::fs;
use std::io;
use std::path::Path;

/// Returns true if `dest` is missing or strictly older than `source`
pub fn needs_update(source: &Path, dest: &Path) -> io::Result<bool> {
    let dest_modified = match fs::metadata(dest) {
        Ok(meta) => meta.modified()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e),
    };
    let source_modified = fs::metadata(source)?.modified()?;

    Ok(dest_modified < source_modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn file_with_mtime(path: &Path, mtime: SystemTime) {
        let file = File::create(path).unwrap();
        file.set_modified(mtime).unwrap();
    }

    #[test]
    fn test_missing_destination_is_stale() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("song.flac");
        file_with_mtime(&src, SystemTime::now());
        assert!(needs_update(&src, &dir.path().join("song.ogg")).unwrap());
    }

    #[test]
    fn test_older_destination_is_stale() {
        let dir = TempDir::new().unwrap();
        let base = SystemTime::now() - Duration::from_secs(3600);
        let src = dir.path().join("song.flac");
        let dst = dir.path().join("song.ogg");
        file_with_mtime(&dst, base);
        file_with_mtime(&src, base + Duration::from_secs(1));
        assert!(needs_update(&src, &dst).unwrap());
    }

    #[test]
    fn test_equal_or_newer_destination_is_fresh() {
        let dir = TempDir::new().unwrap();
        let base = SystemTime::now() - Duration::from_secs(3600);
        let src = dir.path().join("song.flac");
        let dst = dir.path().join("song.ogg");
        file_with_mtime(&src, base);

        file_with_mtime(&dst, base);
        assert!(!needs_update(&src, &dst).unwrap());

        file_with_mtime(&dst, base + Duration::from_secs(60));
        assert!(!needs_update(&src, &dst).unwrap());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("song.ogg");
        file_with_mtime(&dst, SystemTime::now());
        assert!(needs_update(&dir.path().join("gone.flac"), &dst).is_err());
    }
}
