//! RAII guard for the sweep marker

use crate::error::{SweepError, SweepResult};
use std::path::{Path, PathBuf};
use tracing::{error, trace};

/// Exclusive claim on a root directory, held for the duration of one sweep
///
/// Dropping the guard without calling [`SweepLock::release`] still removes
/// the marker, so the claim ends on every exit path including panics and
/// aborted background sweeps.
#[derive(Debug)]
pub struct SweepLock {
    path: PathBuf,
    released: bool,
}

impl SweepLock {
    pub(super) fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Path of the marker file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the marker, reporting failure to the caller
    pub async fn release(mut self) -> SweepResult<()> {
        self.released = true;

        tokio::fs::remove_file(&self.path)
            .await
            .map_err(|source| SweepError::LockRelease {
                path: self.path.clone(),
                source,
            })?;

        trace!("Released sweep marker {}", self.path.display());
        Ok(())
    }

    /// Remove the marker, logging instead of returning a failure
    pub async fn release_logged(self) {
        if let Err(e) = self.release().await {
            error!("{}", e);
        }
    }
}

impl Drop for SweepLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => trace!("Released sweep marker {} on drop", self.path.display()),
            Err(e) => error!(
                "Failed to release sweep marker {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
