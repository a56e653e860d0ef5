//! Subprocess transcoder invoking `sox`
//!
//! Invocation: `<binary> <source> -C <quality> <dest>`. Stdout is discarded,
//! stderr is captured so a failing run can be reported.

use super::traits::Transcoder;
use crate::error::{MirrorError, Result, TranscodeError};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::trace;

/// How often a running transcode is polled when a timeout is set
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Transcoder backed by an external `sox`-compatible binary
#[derive(Debug, Clone)]
pub struct SoxTranscoder {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl SoxTranscoder {
    /// Resolve `name` on PATH (or as a path) and build a transcoder for it
    pub fn locate(name: &str, timeout: Option<Duration>) -> Result<Self> {
        let binary = locate_binary(name).ok_or_else(|| MirrorError::TranscoderNotFound {
            name: name.to_string(),
        })?;
        Ok(Self { binary, timeout })
    }

    /// Use `binary` as-is, without a PATH lookup
    pub fn with_binary(binary: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Resolved path of the transcoder binary
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn wait(&self, child: &mut Child) -> std::result::Result<ExitStatus, TranscodeError> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                // Already exited between the poll and the kill is fine
                let _ = child.kill();
                let _ = child.wait();
                return Err(TranscodeError::TimedOut {
                    binary: self.binary.clone(),
                    timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Transcoder for SoxTranscoder {
    fn transcode(&self, source: &Path, dest: &Path, quality: &str) -> std::result::Result<(), TranscodeError> {
        trace!(
            "{} {} -C {} {}",
            self.binary.display(),
            source.display(),
            quality,
            dest.display()
        );

        let mut child = Command::new(&self.binary)
            .arg(source)
            .arg("-C")
            .arg(quality)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TranscodeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        // Drain stderr on its own thread so a chatty child never blocks on a full pipe
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        // On timeout the reader is left detached: a grandchild of a wrapper
        // script may still hold the pipe open after the kill.
        let status = self.wait(&mut child)?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(TranscodeError::Failed {
                binary: self.binary.clone(),
                status,
                stderr,
            })
        }
    }

    fn name(&self) -> &str {
        "sox"
    }
}

/// Find an executable by name on PATH
///
/// Names containing a path separator are checked directly instead.
pub fn locate_binary(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| executable_names(name).map(move |n| dir.join(n)))
        .find(|path| is_executable(path))
}

#[cfg(windows)]
fn executable_names(name: &str) -> impl Iterator<Item = String> + '_ {
    [String::new(), ".exe".to_string(), ".cmd".to_string(), ".bat".to_string()]
        .into_iter()
        .map(move |suffix| format!("{}{}", name, suffix))
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(name.to_string())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_locate_explicit_path() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "fake-sox", "exit 0");
        let sox = SoxTranscoder::locate(script.to_str().unwrap(), None).unwrap();
        assert_eq!(sox.binary(), script.as_path());
    }

    #[test]
    fn test_locate_rejects_non_executable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain");
        fs::write(&path, "data").unwrap();
        assert_eq!(locate_binary(path.to_str().unwrap()), None);
    }

    #[test]
    fn test_locate_missing_binary_fails() {
        let err = SoxTranscoder::locate("musicmirror-no-such-transcoder", None).unwrap_err();
        assert!(matches!(err, MirrorError::TranscoderNotFound { .. }));
    }

    #[test]
    fn test_passes_arguments_in_order() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "fake-sox", r#"[ "$2" = "-C" ] && [ "$3" = "7" ] && cp "$1" "$4""#);
        let src = dir.path().join("in.flac");
        let dst = dir.path().join("out.ogg");
        fs::write(&src, b"audio").unwrap();

        SoxTranscoder::with_binary(&script, None)
            .transcode(&src, &dst, "7")
            .unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"audio");
    }

    #[test]
    fn test_nonzero_exit_is_reported_with_stderr() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "fake-sox", "echo 'no handler for file' >&2; exit 2");

        let err = SoxTranscoder::with_binary(&script, None)
            .transcode(Path::new("a.flac"), Path::new("a.ogg"), "2")
            .unwrap_err();
        match err {
            TranscodeError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(2));
                assert!(stderr.contains("no handler for file"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_timeout_kills_transcoder() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "slow-sox", "exec sleep 10");

        let started = Instant::now();
        let err = SoxTranscoder::with_binary(&script, Some(Duration::from_millis(200)))
            .transcode(Path::new("a.flac"), Path::new("a.ogg"), "2")
            .unwrap_err();
        assert!(matches!(err, TranscodeError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_returns_while_grandchild_holds_stderr() {
        let dir = TempDir::new().unwrap();
        let script = write_script(dir.path(), "wrapper-sox", "sleep 10\nexit 0");

        let started = Instant::now();
        let err = SoxTranscoder::with_binary(&script, Some(Duration::from_millis(200)))
            .transcode(Path::new("a.flac"), Path::new("a.ogg"), "2")
            .unwrap_err();
        assert!(matches!(err, TranscodeError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_spawn_failure() {
        let err = SoxTranscoder::with_binary("/nonexistent/sox", None)
            .transcode(Path::new("a.flac"), Path::new("a.ogg"), "2")
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Spawn { .. }));
    }
}
