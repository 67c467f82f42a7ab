//! # Logging Setup
//!
//! Builds a `tracing` subscriber from [`LoggingConfig`].
//!
//! The core components never touch process-wide state themselves; they
//! emit `tracing` events and leave subscriber installation to the
//! embedding application, which typically calls [`init`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install a global subscriber per the configuration.
///
/// `RUST_LOG` overrides the configured level when set. Panics if a
/// subscriber is already installed; use [`try_init`] when that is
/// expected (as in tests).
pub fn init(config: &LoggingConfig) {
    try_init(config).expect("global tracing subscriber already installed");
}

/// Fallible variant of [`init`].
///
/// Output goes to the console (stderr) only. When `log_to_console` is
/// false no subscriber is installed at all and events are dropped; the
/// `log_level` and `json_format` settings have no effect in that mode.
pub fn try_init(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if !config.log_to_console {
        return Ok(());
    }

    if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}
