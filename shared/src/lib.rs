//! Shared utilities and common types for TokenSmith server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Telemetry bootstrap
//! - Utility functions (email validation, etc.)

pub mod config;
pub mod telemetry;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{AppConfig, DatabaseConfig, JwtConfig, LoggingConfig};
pub use utils::validation;
