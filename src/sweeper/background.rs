//! Single-task sweep run detached from the caller

use super::report::{SweepReport, SweepStatus};
use crate::lock::{LockState, SweepLock};
use crate::pool::PoolStats;
use crate::walker::{walk_candidates, SessionMatcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinError;
use tracing::{debug, error, trace, warn};

/// Everything the detached task needs, owned
pub(super) struct BackgroundSweep {
    pub root: PathBuf,
    pub matcher: SessionMatcher,
    pub retention: Duration,
    pub lock: SweepLock,
    pub lock_state: LockState,
    pub cancel: Arc<AtomicBool>,
}

impl BackgroundSweep {
    /// Walk and delete, then release the marker
    ///
    /// Failures are only logged; the returned report counts them.
    pub async fn run(self) -> SweepReport {
        trace!("Started file cleanup in background. root: {}", self.root.display());

        let BackgroundSweep {
            root,
            matcher,
            retention,
            lock,
            lock_state,
            cancel,
        } = self;

        let marker = lock.path().to_path_buf();
        let walk_root = root.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            sweep_inline(&walk_root, &matcher, &marker, retention, &cancel)
        })
        .await;

        let report = build_report(&root, lock_state, outcome);

        lock.release_logged().await;
        debug!("Background sweep finished: {:?}", report);
        report
    }
}

/// Fold the inline walk's outcome into the report returned by the handle
fn build_report(
    root: &Path,
    lock_state: LockState,
    outcome: Result<InlineOutcome, JoinError>,
) -> SweepReport {
    let mut report = SweepReport::completed(root, lock_state, &PoolStats::default());
    match outcome {
        Ok(inline) => {
            report.apply(&inline.stats);
            report.walk_errors = inline.walk_errors;
            if inline.cancelled {
                report.status = SweepStatus::Cancelled;
            }
        }
        Err(e) => {
            error!("Background sweep of {} did not complete: {}", root.display(), e);
            report.status = SweepStatus::Failed;
        }
    }
    report
}

struct InlineOutcome {
    stats: PoolStats,
    walk_errors: usize,
    cancelled: bool,
}

/// Test and delete each matching file as the walk reaches it
fn sweep_inline(
    root: &Path,
    matcher: &SessionMatcher,
    marker: &Path,
    retention: Duration,
    cancel: &AtomicBool,
) -> InlineOutcome {
    let mut outcome = InlineOutcome {
        stats: PoolStats::default(),
        walk_errors: 0,
        cancelled: false,
    };

    for candidate in walk_candidates(root, matcher, Some(marker)) {
        if cancel.load(Ordering::Relaxed) {
            debug!("Background sweep of {} cancelled", root.display());
            outcome.cancelled = true;
            break;
        }

        let task = match candidate {
            Ok(task) => task,
            Err(e) => {
                warn!(
                    "Failed to process file or directory. root: {}, err: {}",
                    root.display(),
                    e
                );
                outcome.walk_errors += 1;
                continue;
            }
        };

        outcome.stats.evaluated += 1;
        if !task.is_expired(SystemTime::now(), retention) {
            outcome.stats.retained += 1;
            continue;
        }

        match std::fs::remove_file(&task.path) {
            Ok(()) => {
                debug!("Successfully removed file. path: {}", task.path.display());
                outcome.stats.removed += 1;
            }
            Err(e) => {
                warn!(
                    "Failed to remove file. path: {}, err: {}",
                    task.path.display(),
                    e
                );
                outcome.stats.failed += 1;
            }
        }
    }

    outcome
}
