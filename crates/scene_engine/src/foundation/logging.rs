//! Logging utilities
//!
//! The engine logs through the `log` facade; binaries pick `env_logger` as
//! the backend by calling one of the init functions below.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    init_with_level("warn");
}

/// Initialize the logging system, using `default_level` as the filter when
/// `RUST_LOG` is not set.
///
/// Safe to call more than once: later calls leave the installed logger alone.
pub fn init_with_level(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_err()
    {
        log::debug!("Logger already initialised, keeping existing configuration");
    }
}
