//! Configuration types for the TokenSmith server
//!
//! All configuration is sourced from environment variables (optionally via a
//! `.env` file) following twelve-factor conventions.

mod database;
mod jwt;
mod logging;

pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use logging::LoggingConfig;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Token signing and lifetime configuration
    pub jwt: JwtConfig,

    /// Database connection configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load the full configuration from environment variables.
    ///
    /// Loads a `.env` file first if one is present; real environment
    /// variables take precedence over file entries.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            jwt: JwtConfig::from_env(),
            database: DatabaseConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
