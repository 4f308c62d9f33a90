//! Sweep orchestration
//!
//! A sweep checks the root, claims its marker, runs the walk-and-delete work
//! and releases the marker:
//!
//! ```text
//! Start -> root missing -> Done (no-op)
//! Start -> claim marker -> Denied  -> Done (no-op)
//!                       -> Granted -> run work -> release marker -> Done
//! ```
//!
//! In [`SweepMode::Parallel`] the work is a bounded producer/worker pipeline
//! and the caller waits for it; failures are returned. In
//! [`SweepMode::Background`] the work runs inline in one detached task,
//! failures are only logged, and the caller gets a [`SweepHandle`] it may
//! await or ignore.

mod background;
mod controller;
mod handle;
mod report;


pub use controller::{SweepMode, Sweeper};
pub use handle::SweepHandle;
pub use report::{SweepReport, SweepStatus};
