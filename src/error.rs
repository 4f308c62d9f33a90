//! Error types for sweep operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type for sweep operations
pub type SweepResult<T> = Result<T, SweepError>;

/// Errors raised while sweeping a root directory.
///
/// A missing root or a fresh marker owned by another sweep are not errors;
/// they are reported through [`crate::SweepStatus`].
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Failed to check lock marker {path}: {source}")]
    LockCheck {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create lock marker {path}: {source}")]
    LockCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to reclaim stale lock marker {path}: {source}")]
    LockReclaim {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to release lock marker {path}: {source}")]
    LockRelease {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        source: walkdir::Error,
    },

    #[error("Failed to read modification time of {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove {path}: {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid session pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sweep task did not complete: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("{}", describe_aggregate(.0))]
    Aggregate(Vec<SweepError>),
}

fn describe_aggregate(errors: &[SweepError]) -> String {
    match errors.first() {
        Some(first) => format!("{} failures during sweep, first: {}", errors.len(), first),
        None => "Sweep failed without recording a failure".to_string(),
    }
}

impl SweepError {
    /// Path the failure refers to, when there is one
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SweepError::LockCheck { path, .. }
            | SweepError::LockCreate { path, .. }
            | SweepError::LockReclaim { path, .. }
            | SweepError::LockRelease { path, .. }
            | SweepError::Metadata { path, .. }
            | SweepError::Delete { path, .. } => Some(path),
            SweepError::Walk { root, .. } => Some(root),
            SweepError::Aggregate(errors) => errors.first().and_then(SweepError::path),
            _ => None,
        }
    }

    /// Check whether the failure came from the lock marker
    pub fn is_lock_error(&self) -> bool {
        matches!(
            self,
            SweepError::LockCheck { .. }
                | SweepError::LockCreate { .. }
                | SweepError::LockReclaim { .. }
                | SweepError::LockRelease { .. }
        )
    }

    /// All individual failures carried by this error
    pub fn failures(&self) -> Vec<&SweepError> {
        match self {
            SweepError::Aggregate(errors) => errors.iter().collect(),
            other => vec![other],
        }
    }

    /// The failure reported first
    pub fn first(&self) -> &SweepError {
        match self {
            SweepError::Aggregate(errors) if !errors.is_empty() => &errors[0],
            other => other,
        }
    }
}
