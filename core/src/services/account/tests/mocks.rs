//! Test doubles for account service tests

use async_trait::async_trait;

use crate::errors::{DomainError, DomainResult};
use crate::services::account::PasswordHasher;

/// Reversible stand-in for the real hasher; transparent on purpose
pub struct MockPasswordHasher;

#[async_trait]
impl PasswordHasher for MockPasswordHasher {
    async fn hash(&self, password: &str) -> DomainResult<String> {
        Ok(format!("hashed:{password}"))
    }

    async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool> {
        Ok(password_hash == format!("hashed:{password}"))
    }
}

/// Hasher that always fails, for error-path tests
pub struct FailingPasswordHasher;

#[async_trait]
impl PasswordHasher for FailingPasswordHasher {
    async fn hash(&self, _password: &str) -> DomainResult<String> {
        Err(DomainError::Internal {
            message: "simulated hashing failure".to_string(),
        })
    }

    async fn verify(&self, _password: &str, _password_hash: &str) -> DomainResult<bool> {
        Err(DomainError::Internal {
            message: "simulated hashing failure".to_string(),
        })
    }
}
