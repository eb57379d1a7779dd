//! Tracing subscriber bootstrap
//!
//! Call [`init_tracing`] once at process startup, before any spans or events
//! are emitted. Library crates only use the `tracing` macros and never
//! install a subscriber themselves.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber from the logging configuration.
///
/// Repeated calls are ignored; the first subscriber installed wins. This
/// keeps test binaries that initialize logging in multiple places from
/// panicking.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed, skipping init");
    }
}
