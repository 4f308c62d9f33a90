//! Logging setup for processes hosting the sweeper
//!
//! The library itself only emits `tracing` events. Hosts that have no
//! subscriber of their own can install a formatted one here.

use tracing_subscriber::EnvFilter;

/// Map a verbosity count to a default filter directive
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `verbose`. Returns false when a global
/// subscriber was already installed.
pub fn init_tracing(verbose: u8) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .try_init()
        .is_ok()
}
