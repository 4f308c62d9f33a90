//! Handle to a dispatched sweep

use super::report::SweepReport;
use crate::error::SweepResult;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle returned when a sweep is dispatched
///
/// Background sweeps keep running whether or not the handle is awaited;
/// dropping the handle detaches them. Awaiting [`SweepHandle::wait`] gives
/// the caller a deterministic completion point.
#[derive(Debug)]
pub struct SweepHandle {
    root: PathBuf,
    state: HandleState,
}

#[derive(Debug)]
enum HandleState {
    Ready(SweepReport),
    Running {
        task: JoinHandle<SweepReport>,
        cancel: Arc<AtomicBool>,
    },
}

impl SweepHandle {
    pub(crate) fn ready(report: SweepReport) -> Self {
        Self {
            root: report.root.clone(),
            state: HandleState::Ready(report),
        }
    }

    pub(crate) fn running(
        root: PathBuf,
        task: JoinHandle<SweepReport>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            root,
            state: HandleState::Running { task, cancel },
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_finished(&self) -> bool {
        match &self.state {
            HandleState::Ready(_) => true,
            HandleState::Running { task, .. } => task.is_finished(),
        }
    }

    /// Ask a background sweep to stop before its next file
    ///
    /// A deletion already in progress is not interrupted. The sweep still
    /// releases its marker, and [`SweepHandle::wait`] reports
    /// [`super::SweepStatus::Cancelled`].
    pub fn cancel(&self) {
        if let HandleState::Running { cancel, .. } = &self.state {
            cancel.store(true, Ordering::Relaxed);
        }
    }

    /// Wait for the sweep to finish
    pub async fn wait(self) -> SweepResult<SweepReport> {
        match self.state {
            HandleState::Ready(report) => Ok(report),
            HandleState::Running { task, .. } => Ok(task.await?),
        }
    }
}
