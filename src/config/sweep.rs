//! Sweep configuration types and defaults

use crate::error::{SweepError, SweepResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a sweep
///
/// Every field has a default, so an empty TOML or YAML document is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Age after which session files are eligible for removal and a marker
    /// left behind by another sweep is considered abandoned
    #[serde(with = "humantime_serde", default = "default_retention")]
    pub retention: Duration,

    /// Number of deletion workers in parallel mode
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Capacity of the queue between the walker and the workers
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Glob matched against the base name of every file under the root
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Name of the marker file created directly under the root
    #[serde(default = "default_marker_name")]
    pub marker_name: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            retention: default_retention(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            pattern: default_pattern(),
            marker_name: default_marker_name(),
        }
    }
}

impl SweepConfig {
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_marker_name(mut self, marker_name: impl Into<String>) -> Self {
        self.marker_name = marker_name.into();
        self
    }

    /// Validate the configuration values
    pub fn validate(&self) -> SweepResult<()> {
        if self.retention.is_zero() {
            return Err(SweepError::Config(
                "retention must be greater than zero".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(SweepError::Config(
                "workers must be at least 1".to_string(),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(SweepError::Config(
                "queue_capacity must be at least 1".to_string(),
            ));
        }

        if self.marker_name.is_empty()
            || self.marker_name == "."
            || self.marker_name == ".."
            || self.marker_name.contains(['/', '\\'])
        {
            return Err(SweepError::Config(format!(
                "marker_name '{}' must be a plain file name",
                self.marker_name
            )));
        }

        glob::Pattern::new(&self.pattern).map_err(|source| SweepError::InvalidPattern {
            pattern: self.pattern.clone(),
            source,
        })?;

        Ok(())
    }
}

pub(crate) fn default_retention() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

pub(crate) fn default_workers() -> usize {
    2
}

pub(crate) fn default_queue_capacity() -> usize {
    300
}

pub(crate) fn default_pattern() -> String {
    "sess_*".to_string()
}

pub(crate) fn default_marker_name() -> String {
    ".lock".to_string()
}
