//! # TokenSmith Infrastructure
//!
//! Infrastructure layer for the TokenSmith backend: MySQL implementations
//! of the core persistence traits, the transaction manager over the
//! connection pool, and the argon2 password hasher.

pub mod database;
pub mod password;

pub use database::connection::DatabasePool;
pub use database::mysql::{MySqlSessionStore, MySqlUserRepository};
pub use database::tx::SqlTransactionManager;
pub use password::Argon2PasswordHasher;

use thiserror::Error;

/// Infrastructure setup errors (pool creation, migrations)
///
/// Runtime persistence errors flow through
/// [`DomainError`](tk_core::errors::DomainError) instead; this type only
/// covers wiring that happens before the services exist.
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),
}
