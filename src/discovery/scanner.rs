//! File discovery and scanning

use crate::error::{MirrorError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Which files a discovery pass picks up
#[derive(Debug, Clone, Copy)]
pub enum MatchRule<'a> {
    /// Files whose extension (case-sensitive, no dot) is one of these
    Extensions(&'a [String]),
    /// Files whose base name is exactly one of these
    FileNames(&'a [String]),
}

impl MatchRule<'_> {
    /// Check a path against the rule
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            MatchRule::Extensions(exts) => path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| exts.iter().any(|x| x == ext)),
            MatchRule::FileNames(names) => path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| names.iter().any(|x| x == name)),
        }
    }
}

/// Recursively collect every regular file under `root` matching `rule`
///
/// Symlinked files and directories are followed. A missing or unreadable
/// root is an error; unreadable subdirectories and link loops are logged and
/// skipped.
pub fn discover(root: &Path, rule: MatchRule<'_>) -> Result<BTreeSet<PathBuf>> {
    if !root.exists() {
        return Err(MirrorError::SourceNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(MirrorError::Discovery {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let mut files = BTreeSet::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(MirrorError::Discovery {
                    path: root.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && rule.matches(entry.path()) {
            debug!("Discovered: {}", entry.path().display());
            files.insert(entry.into_path());
        }
    }

    info!("Discovered {} files in {}", files.len(), root.display());

    Ok(files)
}
