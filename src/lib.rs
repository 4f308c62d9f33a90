//! # Session Sweeper
//!
//! Removes expired session files from a root directory tree while making
//! sure at most one sweep runs against a given root at a time.
//!
//! ## Usage
//!
//! ```no_run
//! use session_sweeper::{SweepConfig, SweepMode, Sweeper};
//!
//! # async fn run() -> Result<(), session_sweeper::SweepError> {
//! let sweeper = Sweeper::new(SweepConfig::default())?;
//!
//! // Blocks until every expired `sess_*` file older than 24h is gone
//! let report = sweeper.sweep_parallel("/var/lib/app/sessions").await?;
//! println!("removed {} files", report.removed);
//!
//! // Returns once the root is claimed; the work continues in the background
//! let handle = sweeper.sweep("/var/lib/app/sessions", SweepMode::Background).await?;
//! let report = handle.wait().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `config` - Retention threshold, pool size, queue capacity, pattern and marker name
//! - `lock` - Marker file claim with atomic creation and stale reclamation
//! - `walker` - Lazy recursive walk yielding matching session files
//! - `pool` - Bounded producer/worker deletion pipeline
//! - `aggregate` - Thread-safe failure collection
//! - `sweeper` - Controller for parallel and background sweeps
//! - `logging` - Optional tracing subscriber setup for host processes
pub mod aggregate;
pub mod config;
pub mod error;
pub mod lock;
pub mod logging;
pub mod pool;
pub mod sweeper;
pub mod walker;

pub use config::SweepConfig;
pub use error::{SweepError, SweepResult};
pub use lock::LockState;
pub use sweeper::{SweepHandle, SweepMode, SweepReport, SweepStatus, Sweeper};
