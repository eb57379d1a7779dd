//! Argon2 password hashing

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use async_trait::async_trait;

use tk_core::errors::{DomainError, DomainResult};
use tk_core::services::account::PasswordHasher;

/// Argon2id implementation of the password hashing seam
///
/// Produces PHC-format strings; verification is delegated entirely to the
/// argon2 crate and parameter changes are picked up transparently because
/// the parameters travel inside the stored hash.
pub struct Argon2PasswordHasher;

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::Internal {
                message: format!("password hashing failed: {e}"),
            })?
            .to_string();
        Ok(hash)
    }

    async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool> {
        let parsed = PasswordHash::new(password_hash).map_err(|e| DomainError::Internal {
            message: format!("stored password hash is not valid PHC: {e}"),
        })?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(DomainError::Internal {
                message: format!("password verification failed: {e}"),
            }),
        }
    }
}
