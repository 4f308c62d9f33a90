//! Sweep controller

use super::background::BackgroundSweep;
use super::handle::SweepHandle;
use super::report::SweepReport;
use crate::aggregate::ErrorAggregator;
use crate::config::SweepConfig;
use crate::error::SweepResult;
use crate::lock::{acquire_marker, LockAcquisition, LockState, SweepLock};
use crate::pool::run_pipeline;
use crate::walker::SessionMatcher;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// How the walk-and-delete work runs once the root is claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepMode {
    /// Producer plus worker pool; the caller waits for every worker
    #[default]
    Parallel,
    /// One detached task; the caller gets a handle back immediately
    Background,
}

/// Result of the shared root check and marker claim
enum Claim {
    Skip(SweepReport),
    Held(SweepLock, LockState),
}

/// Sweeps expired session files out of root directories
#[derive(Debug, Clone)]
pub struct Sweeper {
    config: Arc<SweepConfig>,
    matcher: SessionMatcher,
}

impl Sweeper {
    pub fn new(config: SweepConfig) -> SweepResult<Self> {
        config.validate()?;
        let matcher = SessionMatcher::from_config(&config)?;
        Ok(Self {
            config: Arc::new(config),
            matcher,
        })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Sweep `root` in the given mode
    ///
    /// Parallel sweeps run to completion before this returns and hand back an
    /// already finished handle. Background sweeps return as soon as the
    /// marker is claimed.
    pub async fn sweep(&self, root: impl AsRef<Path>, mode: SweepMode) -> SweepResult<SweepHandle> {
        match mode {
            SweepMode::Parallel => Ok(SweepHandle::ready(self.sweep_parallel(root).await?)),
            SweepMode::Background => self.sweep_background(root).await,
        }
    }

    /// Sweep `root` and wait for every deletion to finish
    ///
    /// Lock, walk and deletion failures are returned. When several occur they
    /// are all returned together, led by the first one recorded. The marker is
    /// removed before returning whatever the outcome.
    ///
    /// The sweep runs on its own task. Dropping the returned future detaches
    /// it: the marker stays in place until every deletion has finished.
    pub async fn sweep_parallel(&self, root: impl AsRef<Path>) -> SweepResult<SweepReport> {
        let sweeper = self.clone();
        let root = root.as_ref().to_path_buf();
        tokio::spawn(async move { sweeper.run_parallel(&root, ErrorAggregator::new()).await })
            .await?
    }

    /// Claim `root` and hand the sweep to a detached task
    ///
    /// Only root and marker failures are returned here. Everything that goes
    /// wrong inside the detached task is logged, and the task removes the
    /// marker itself when it finishes.
    pub async fn sweep_background(&self, root: impl AsRef<Path>) -> SweepResult<SweepHandle> {
        let root = root.as_ref().to_path_buf();

        // The claim completes even if this future is dropped; its guard then removes the marker
        let sweeper = self.clone();
        let claim_root = root.clone();
        let claim = tokio::spawn(async move {
            sweeper.claim(&claim_root, SweepMode::Background).await
        })
        .await??;

        let (lock, lock_state) = match claim {
            Claim::Skip(report) => return Ok(SweepHandle::ready(report)),
            Claim::Held(lock, state) => (lock, state),
        };

        let cancel = Arc::new(AtomicBool::new(false));
        let sweep = BackgroundSweep {
            root: root.clone(),
            matcher: self.matcher.clone(),
            retention: self.config.retention,
            lock,
            lock_state,
            cancel: Arc::clone(&cancel),
        };

        let task = tokio::spawn(sweep.run());
        Ok(SweepHandle::running(root, task, cancel))
    }

    /// Claim, run the pipeline, release
    ///
    /// `errors` collects every failure of this sweep; anything already in it
    /// is reported alongside the pipeline's own failures.
    pub(super) async fn run_parallel(
        &self,
        root: &Path,
        errors: ErrorAggregator,
    ) -> SweepResult<SweepReport> {
        let (lock, lock_state) = match self.claim(root, SweepMode::Parallel).await? {
            Claim::Skip(report) => return Ok(report),
            Claim::Held(lock, state) => (lock, state),
        };

        let stats = run_pipeline(
            root.to_path_buf(),
            self.matcher.clone(),
            Some(lock.path().to_path_buf()),
            self.config.workers,
            self.config.queue_capacity,
            self.config.retention,
            errors.clone(),
        )
        .await;

        lock.release_logged().await;

        errors.finish()?;

        let report = SweepReport::completed(root, lock_state, &stats);
        info!(
            "Swept {}: removed {} of {} session files",
            root.display(),
            report.removed,
            report.evaluated
        );
        Ok(report)
    }

    async fn claim(&self, root: &Path, mode: SweepMode) -> SweepResult<Claim> {
        if let Err(e) = tokio::fs::metadata(root).await {
            if e.kind() == std::io::ErrorKind::NotFound {
                trace!("Directory not found. root: {}", root.display());
                return Ok(Claim::Skip(SweepReport::root_missing(root)));
            }
        }

        match acquire_marker(root, &self.config).await? {
            LockAcquisition::Granted(lock) => Ok(Claim::Held(lock, LockState::Granted)),
            LockAcquisition::Reclaimed(lock) => Ok(Claim::Held(lock, LockState::Reclaimed)),
            LockAcquisition::Denied { age, holder } => {
                let holder = holder
                    .map(|info| info.to_string())
                    .unwrap_or_else(|| "unknown holder".to_string());
                // Denials log at warn for parallel sweeps, debug for background
                match mode {
                    SweepMode::Parallel => warn!(
                        "Sweep marker on {} is {:?} old, held by {}; skipping sweep",
                        root.display(),
                        age,
                        holder
                    ),
                    SweepMode::Background => debug!(
                        "Sweep marker on {} is {:?} old, held by {}; skipping sweep",
                        root.display(),
                        age,
                        holder
                    ),
                }
                Ok(Claim::Skip(SweepReport::denied(root)))
            }
        }
    }
}
