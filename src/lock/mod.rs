//! Sweep marker management
//!
//! A sweep claims its root directory by creating a marker file directly under
//! it. The marker's existence means "a sweep is in progress"; its modification
//! time tells how long ago that sweep started.
//!
//! # Acquisition
//!
//! Markers are created with **create_new** semantics (exclusive create), so
//! the existence check and the creation are a single filesystem operation.
//! A marker older than the retention threshold is treated as abandoned by a
//! crashed sweep and reclaimed.
//!
//! # Release
//!
//! [`SweepLock`] removes the marker when released or dropped.

mod acquire;
mod guard;
mod marker;

#[cfg(test)]
mod tests;

pub use acquire::{acquire_marker, marker_path, read_marker_info, LockAcquisition, LockState};
pub use guard::SweepLock;
pub use marker::MarkerInfo;
