//! User repository trait defining the interface for user persistence.

use async_trait::async_trait;

use crate::domain::entities::user::User;
use crate::errors::DomainResult;
use crate::transaction::TransactionUnit;

/// Repository trait for User entity persistence operations
///
/// Operations take an optional transaction unit like every other
/// repository-style collaborator: run inside the supplied unit, or own a
/// short-lived one when none is given.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by email address
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that email
    async fn find_by_email(
        &self,
        email: &str,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Option<User>>;

    /// Insert a new user record
    ///
    /// # Errors
    /// * [`AuthError::UserAlreadyExists`](crate::errors::AuthError) - the
    ///   email is already taken (unique-key violation)
    async fn create_user(
        &self,
        user: &User,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<()>;
}
