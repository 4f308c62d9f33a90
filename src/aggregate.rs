//! Failure collection shared by the walker and the deletion workers

use crate::error::{SweepError, SweepResult};
use std::sync::{Arc, Mutex};

/// Thread-safe collector of sweep failures
///
/// Every recorded failure is kept in the order it was recorded. Cloning the
/// aggregator shares the same underlying collection.
#[derive(Debug, Clone, Default)]
pub struct ErrorAggregator {
    errors: Arc<Mutex<Vec<SweepError>>>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, error: SweepError) {
        self.errors
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(error);
    }

    pub fn len(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the recorded failures into a single outcome
    ///
    /// No failures yields `Ok(())`, one failure is returned as is, and
    /// several are wrapped in [`SweepError::Aggregate`] with the first
    /// recorded failure leading.
    pub fn finish(&self) -> SweepResult<()> {
        let mut errors = std::mem::take(
            &mut *self
                .errors
                .lock()
                .unwrap_or_else(|poison| poison.into_inner()),
        );

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(SweepError::Aggregate(errors)),
        }
    }
}
