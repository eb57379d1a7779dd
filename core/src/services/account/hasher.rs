//! Password hashing seam

use async_trait::async_trait;

use crate::errors::DomainResult;

/// One-way password hashing abstraction
///
/// The hashing primitive is a black box to the domain layer; the concrete
/// implementation lives in the infrastructure crate. Hashing is
/// deliberately async so implementations can move the work off the async
/// executor.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a raw password into a storable string
    async fn hash(&self, password: &str) -> DomainResult<String>;

    /// Check a raw password against a stored hash
    async fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool>;
}
