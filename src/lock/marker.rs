//! Diagnostic metadata written into the marker file

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata stored in the marker file
///
/// Purely informational: staleness is decided from the marker's modification
/// time, so a marker written by an older sweeper (or an empty one) is still
/// honored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerInfo {
    pub process_id: u32,
    pub hostname: String,
    pub created_at: DateTime<Utc>,
}

impl MarkerInfo {
    pub fn current() -> Self {
        Self {
            process_id: std::process::id(),
            hostname: get_hostname(),
            created_at: Utc::now(),
        }
    }

    /// Parse marker contents, returning None for anything unrecognised
    pub fn parse(contents: &str) -> Option<Self> {
        serde_json::from_str(contents).ok()
    }

    /// Read the metadata of an existing marker
    ///
    /// Returns Ok(None) when the marker is gone or holds no metadata.
    pub async fn read(path: &Path) -> std::io::Result<Option<Self>> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for MarkerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PID {} on {} (created {})",
            self.process_id,
            self.hostname,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}
