//! Logging configuration module

use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log filter directive (e.g. "info", "tk_core=debug,sqlx=warn")
    pub filter: String,

    /// Emit logs as JSON instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: String::from("info"),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let filter = std::env::var("LOG_FILTER")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(defaults.filter);
        let json = std::env::var("LOG_JSON")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.json);

        Self { filter, json }
    }
}
