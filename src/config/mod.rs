//! Sweep configuration
//!
//! Retention threshold, pool size, queue capacity, target pattern and marker
//! name are passed explicitly into every sweep. Configurations can be built in
//! code or loaded from TOML/YAML files with human-readable durations.

mod loader;
mod sweep;


pub use sweep::SweepConfig;
