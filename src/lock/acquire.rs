//! Marker acquisition with stale-marker reclamation

use super::guard::SweepLock;
use super::marker::MarkerInfo;
use crate::config::SweepConfig;
use crate::error::{SweepError, SweepResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

/// Exclusive creates attempted before giving the root up to a racing sweeper
const MAX_CREATE_ATTEMPTS: usize = 2;

/// How a marker claim was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No marker existed
    Granted,
    /// An abandoned marker was removed first
    Reclaimed,
}

/// Outcome of trying to claim a root directory
#[derive(Debug)]
pub enum LockAcquisition {
    Granted(SweepLock),
    Reclaimed(SweepLock),
    /// A live marker exists; another sweep is running or ran recently
    Denied {
        age: Duration,
        holder: Option<MarkerInfo>,
    },
}

impl LockAcquisition {
    pub fn state(&self) -> Option<LockState> {
        match self {
            LockAcquisition::Granted(_) => Some(LockState::Granted),
            LockAcquisition::Reclaimed(_) => Some(LockState::Reclaimed),
            LockAcquisition::Denied { .. } => None,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, LockAcquisition::Denied { .. })
    }

    /// Take the guard out of a successful acquisition
    pub fn into_lock(self) -> Option<SweepLock> {
        match self {
            LockAcquisition::Granted(lock) | LockAcquisition::Reclaimed(lock) => Some(lock),
            LockAcquisition::Denied { .. } => None,
        }
    }
}

/// Path of the marker for a root directory
pub fn marker_path(root: &Path, config: &SweepConfig) -> PathBuf {
    root.join(&config.marker_name)
}

/// Claim a root directory for one sweep
///
/// The marker is created with exclusive-create semantics, so two sweepers
/// racing on the same root cannot both be granted. A marker whose age has
/// reached `config.retention` is removed and the create is retried once.
pub async fn acquire_marker(root: &Path, config: &SweepConfig) -> SweepResult<LockAcquisition> {
    let path = marker_path(root, config);
    let mut reclaimed = false;
    let mut last_age = Duration::ZERO;

    for _ in 0..MAX_CREATE_ATTEMPTS {
        match create_marker(&path).await {
            Ok(()) => {
                let lock = SweepLock::new(path);
                return Ok(if reclaimed {
                    debug!("Acquired sweep marker {} after reclaiming", lock.path().display());
                    LockAcquisition::Reclaimed(lock)
                } else {
                    debug!("Acquired sweep marker {}", lock.path().display());
                    LockAcquisition::Granted(lock)
                });
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(source) => {
                error!("Failed to create sweep marker {}: {}", path.display(), source);
                return Err(SweepError::LockCreate { path, source });
            }
        }

        // Marker vanished between the create and the stat: its holder just
        // released it, so try again
        let Some(age) = marker_age(&path).await? else {
            continue;
        };
        last_age = age;

        if age < config.retention || reclaimed {
            return Ok(denied(&path, age).await);
        }

        warn!(
            "Reclaiming abandoned sweep marker {} (age {:?})",
            path.display(),
            age
        );
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            // Another sweeper reclaimed it first
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                error!("Failed to remove stale sweep marker {}: {}", path.display(), source);
                return Err(SweepError::LockReclaim { path, source });
            }
        }
        reclaimed = true;
    }

    Ok(denied(&path, last_age).await)
}

/// Read the metadata of the marker currently held on a root, if any
pub async fn read_marker_info(root: &Path, config: &SweepConfig) -> SweepResult<Option<MarkerInfo>> {
    let path = marker_path(root, config);
    MarkerInfo::read(&path)
        .await
        .map_err(|source| SweepError::LockCheck { path, source })
}

async fn denied(path: &Path, age: Duration) -> LockAcquisition {
    let holder = MarkerInfo::read(path).await.ok().flatten();
    LockAcquisition::Denied { age, holder }
}

async fn create_marker(path: &Path) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;

    let written = match MarkerInfo::current().to_json() {
        Ok(json) => match file.write_all(json.as_bytes()).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        },
        Err(e) => Err(std::io::Error::new(ErrorKind::InvalidData, e)),
    };

    if let Err(e) = written {
        drop(file);
        let _ = tokio::fs::remove_file(path).await;
        return Err(e);
    }

    Ok(())
}

/// Age of the marker from its modification time, None if it does not exist
async fn marker_age(path: &Path) -> SweepResult<Option<Duration>> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            error!("Failed to check sweep marker {}: {}", path.display(), source);
            return Err(SweepError::LockCheck {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let modified = metadata.modified().map_err(|source| SweepError::LockCheck {
        path: path.to_path_buf(),
        source,
    })?;

    // A modification time in the future counts as brand new
    Ok(Some(
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO),
    ))
}
