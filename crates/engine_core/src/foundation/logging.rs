//! Logging utilities and structured logging support
//!
//! The library only emits records through the `log` facade. Binaries pick
//! the backend; these helpers wire up `env_logger` the same way everywhere.

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a default level, still overridable via `RUST_LOG`
///
/// Unknown level names fall back to `info`. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init_with_level(level: &str) {
    let filter = level.parse::<log::LevelFilter>().unwrap_or(log::LevelFilter::Info);
    let _ = env_logger::Builder::from_default_env()
        .filter_level(filter)
        .parse_default_env()
        .try_init();
}
