//! Sweep outcome reporting

use crate::lock::LockState;
use crate::pool::PoolStats;
use std::path::{Path, PathBuf};

/// How a sweep attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStatus {
    /// The lock was held and the walk ran to the end
    Completed,
    /// The root directory does not exist; nothing was touched
    RootMissing,
    /// A live marker belongs to another sweep; nothing was touched
    Denied,
    /// A background sweep stopped early at the caller's request
    Cancelled,
    /// The background walk died before reaching the end; counts are partial
    Failed,
}

/// Summary of one sweep attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub root: PathBuf,
    pub status: SweepStatus,
    /// How the marker was claimed, None when it never was
    pub lock: Option<LockState>,
    /// Matching files whose age was checked
    pub evaluated: usize,
    pub removed: usize,
    /// Matching files younger than the retention threshold
    pub retained: usize,
    /// Deletions that failed
    pub failed: usize,
    /// Traversal failures logged and skipped by a background sweep
    pub walk_errors: usize,
}

impl SweepReport {
    fn empty(root: &Path, status: SweepStatus, lock: Option<LockState>) -> Self {
        Self {
            root: root.to_path_buf(),
            status,
            lock,
            evaluated: 0,
            removed: 0,
            retained: 0,
            failed: 0,
            walk_errors: 0,
        }
    }

    pub fn root_missing(root: &Path) -> Self {
        Self::empty(root, SweepStatus::RootMissing, None)
    }

    pub fn denied(root: &Path) -> Self {
        Self::empty(root, SweepStatus::Denied, None)
    }

    pub fn completed(root: &Path, lock: LockState, stats: &PoolStats) -> Self {
        let mut report = Self::empty(root, SweepStatus::Completed, Some(lock));
        report.apply(stats);
        report
    }

    pub(crate) fn apply(&mut self, stats: &PoolStats) {
        self.evaluated += stats.evaluated;
        self.removed += stats.removed;
        self.retained += stats.retained;
        self.failed += stats.failed;
    }

    /// True when the sweep did not touch the root at all
    pub fn is_noop(&self) -> bool {
        matches!(self.status, SweepStatus::RootMissing | SweepStatus::Denied)
    }
}
