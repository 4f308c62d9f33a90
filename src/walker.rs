//! Directory walker producing session file candidates
//!
//! Traverses a root directory recursively and yields every regular file whose
//! base name matches the session pattern. The walker never decides whether a
//! file is old enough to delete; it forwards the modification time and leaves
//! that decision to the consumer.

use crate::config::SweepConfig;
use crate::error::{SweepError, SweepResult};
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use walkdir::WalkDir;

/// A candidate file for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl FileTask {
    /// Check whether the file is strictly older than `now - retention`
    pub fn is_expired(&self, now: SystemTime, retention: Duration) -> bool {
        match now.checked_sub(retention) {
            Some(cutoff) => self.modified < cutoff,
            None => false,
        }
    }
}

/// Base-name matcher for session files
#[derive(Debug, Clone)]
pub struct SessionMatcher {
    pattern: Pattern,
}

impl SessionMatcher {
    pub fn new(pattern: &str) -> SweepResult<Self> {
        let pattern = Pattern::new(pattern).map_err(|source| SweepError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    pub fn from_config(config: &SweepConfig) -> SweepResult<Self> {
        Self::new(&config.pattern)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.pattern.matches(name)
    }
}

/// Lazily walk `root`, yielding a task for every matching regular file
///
/// Traversal failures are yielded as `Err(SweepError::Walk)` and the walk
/// carries on with the remaining entries; callers that must stop on the first
/// failure simply stop consuming. Symlinks are not followed, and the file at
/// `skip` (the sweep marker) is never yielded.
pub fn walk_candidates<'a>(
    root: &'a Path,
    matcher: &'a SessionMatcher,
    skip: Option<&'a Path>,
) -> impl Iterator<Item = SweepResult<FileTask>> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(SweepError::Walk {
                        root: root.to_path_buf(),
                        source,
                    }))
                }
            };

            if !entry.file_type().is_file() {
                return None;
            }

            let name = entry.file_name().to_string_lossy();
            if !matcher.matches_name(&name) || skip == Some(entry.path()) {
                return None;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(source) => {
                    return Some(Err(SweepError::Walk {
                        root: root.to_path_buf(),
                        source,
                    }))
                }
            };

            Some(match metadata.modified() {
                Ok(modified) => Ok(FileTask {
                    path: entry.into_path(),
                    modified,
                }),
                Err(source) => Err(SweepError::Metadata {
                    path: entry.into_path(),
                    source,
                }),
            })
        })
}
