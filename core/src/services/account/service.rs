//! Main account service implementation

use std::sync::Arc;

use tk_shared::utils::validation;

use crate::clock::Clock;
use crate::domain::entities::token::TokenPair;
use crate::domain::entities::user::{NewUser, User};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{SessionStore, UserRepository};
use crate::services::token::TokenService;
use crate::transaction::{TransactionManager, TransactionUnit};

use super::hasher::PasswordHasher;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Service for compound account operations
///
/// Orchestrates the user repository and the token service so that
/// multi-entity writes (user row plus refresh session) commit or roll back
/// together under one transaction unit.
pub struct AccountService<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repository: Arc<U>,
    token_service: Arc<TokenService<S>>,
    password_hasher: Arc<dyn PasswordHasher>,
    tx_manager: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
}

impl<U, S> AccountService<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    /// Creates a new account service instance
    pub fn new(
        user_repository: Arc<U>,
        token_service: Arc<TokenService<S>>,
        password_hasher: Arc<dyn PasswordHasher>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            token_service,
            password_hasher,
            tx_manager,
            clock,
        }
    }

    /// Creates a user and issues their first token pair atomically
    ///
    /// Input shape and uniqueness are checked before the unit opens, so the
    /// transaction stays short. The user insert and the refresh session
    /// insert share one unit: if token issuance fails after the user row
    /// was written, the user row is rolled back too.
    pub async fn register(
        &self,
        new_user: NewUser,
        device_info: &str,
    ) -> DomainResult<(User, TokenPair)> {
        self.validate(&new_user)?;

        if self
            .user_repository
            .find_by_email(&new_user.email, None)
            .await?
            .is_some()
        {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let password_hash = self.password_hasher.hash(&new_user.password).await?;
        let user = User::new(
            new_user.email,
            new_user.name,
            password_hash,
            self.clock.now(),
        );

        let mut unit = self.tx_manager.begin(false).await?;
        match self
            .register_in_unit(&user, device_info, unit.as_mut())
            .await
        {
            Ok(pair) => {
                unit.commit().await?;
                tracing::info!(user_id = %user.id, "registered user with initial tokens");
                Ok((user, pair))
            }
            Err(error) => {
                if let Err(rollback_error) = unit.rollback().await {
                    tracing::error!(
                        error = %rollback_error,
                        "rollback failed after registration error"
                    );
                }
                Err(error)
            }
        }
    }

    async fn register_in_unit(
        &self,
        user: &User,
        device_info: &str,
        unit: &mut dyn TransactionUnit,
    ) -> DomainResult<TokenPair> {
        self.user_repository
            .create_user(user, Some(&mut *unit))
            .await?;
        self.token_service
            .issue_login_tokens(user.id, device_info, Some(&mut *unit))
            .await
    }

    /// Authenticates credentials and issues a token pair
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device_info: &str,
    ) -> DomainResult<(User, TokenPair)> {
        let user = self
            .user_repository
            .find_by_email(email, None)
            .await?
            // an unknown email reads the same as a wrong password
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = self
            .password_hasher
            .verify(password, &user.password_hash)
            .await?;
        if !matches {
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self
            .token_service
            .issue_login_tokens(user.id, device_info, None)
            .await?;

        tracing::info!(user_id = %user.id, "user logged in");
        Ok((user, pair))
    }

    fn validate(&self, new_user: &NewUser) -> DomainResult<()> {
        if !validation::is_valid_email(&new_user.email) {
            return Err(DomainError::Validation {
                message: "invalid email address".to_string(),
            });
        }
        if !validation::not_empty(&new_user.name) {
            return Err(DomainError::Validation {
                message: "name must not be empty".to_string(),
            });
        }
        if !validation::length_between(&new_user.password, MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH)
        {
            return Err(DomainError::Validation {
                message: format!(
                    "password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters"
                ),
            });
        }
        Ok(())
    }
}
