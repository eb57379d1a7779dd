//! Main token service implementation

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::session::RefreshSession;
use crate::domain::entities::token::{Claims, TokenKind, TokenPair};
use crate::errors::{DomainError, DomainResult, SessionError, TokenError};
use crate::repositories::SessionStore;
use crate::services::signer::CredentialSigner;
use crate::transaction::{TransactionManager, TransactionUnit};

use super::config::TokenServiceConfig;

/// How a refresh attempt failed inside its transaction unit
///
/// `Compromised` failures revoke the session's whole rotation chain and
/// commit that revocation before the error propagates; plain failures roll
/// the unit back.
enum RefreshFailure {
    Compromised {
        rotation_chain: Uuid,
        error: DomainError,
    },
    Fail(DomainError),
}

/// Service for the signed-credential lifecycle: issue, refresh, revoke
pub struct TokenService<S: SessionStore> {
    store: Arc<S>,
    signer: Arc<CredentialSigner>,
    tx_manager: Arc<dyn TransactionManager>,
    clock: Arc<dyn Clock>,
    config: TokenServiceConfig,
}

impl<S: SessionStore> TokenService<S> {
    /// Creates a new token service instance
    pub fn new(
        store: Arc<S>,
        signer: Arc<CredentialSigner>,
        tx_manager: Arc<dyn TransactionManager>,
        clock: Arc<dyn Clock>,
        config: TokenServiceConfig,
    ) -> Self {
        Self {
            store,
            signer,
            tx_manager,
            clock,
            config,
        }
    }

    /// Issues an access/refresh pair for a fresh login
    ///
    /// Creates a refresh session opening a new rotation chain and signs a
    /// token pair against it. When a transaction unit is supplied the
    /// session insert joins it and the caller decides the commit; otherwise
    /// the service owns a short-lived unit for the call.
    pub async fn issue_login_tokens(
        &self,
        user_id: Uuid,
        device_info: &str,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<TokenPair> {
        match unit {
            Some(unit) => self.issue_in_unit(user_id, device_info, unit).await,
            None => {
                let mut unit = self.tx_manager.begin(false).await?;
                match self.issue_in_unit(user_id, device_info, unit.as_mut()).await {
                    Ok(pair) => {
                        unit.commit().await?;
                        Ok(pair)
                    }
                    Err(error) => {
                        if let Err(rollback_error) = unit.rollback().await {
                            tracing::error!(
                                error = %rollback_error,
                                "rollback failed after token issuance error"
                            );
                        }
                        Err(error)
                    }
                }
            }
        }
    }

    async fn issue_in_unit(
        &self,
        user_id: Uuid,
        device_info: &str,
        unit: &mut dyn TransactionUnit,
    ) -> DomainResult<TokenPair> {
        let ttl = Duration::seconds(self.config.refresh_token_expiry);
        let session = self
            .store
            .create_session(user_id, device_info, ttl, Some(&mut *unit))
            .await?;

        let pair = self.sign_pair(user_id, &session)?;
        tracing::info!(
            user_id = %user_id,
            session_id = %session.id,
            rotation_chain = %session.rotation_chain,
            "issued login token pair"
        );
        Ok(pair)
    }

    /// Exchanges a refresh token for a fresh access/refresh pair
    ///
    /// The signed token is verified first (signature, kind, expiry), then
    /// its backing session is rotated inside one transaction unit. A session
    /// that is no longer `active` means the presented credential was already
    /// consumed, so the legitimate chain must be considered compromised: the
    /// whole rotation chain is revoked and that revocation is committed
    /// before the failure surfaces. Losing the rotation race to a concurrent
    /// caller is handled the same way.
    pub async fn refresh(&self, refresh_token: &str, device_info: &str) -> DomainResult<TokenPair> {
        let claims = self.signer.verify(refresh_token, TokenKind::Refresh)?;
        let session_id = claims
            .subject_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;

        let mut unit = self.tx_manager.begin(false).await?;
        match self
            .rotate_in_unit(session_id, device_info, unit.as_mut())
            .await
        {
            Ok((successor, pair)) => {
                unit.commit().await?;
                tracing::info!(
                    user_id = %successor.user_id,
                    session_id = %successor.id,
                    rotation_chain = %successor.rotation_chain,
                    "rotated refresh session"
                );
                Ok(pair)
            }
            Err(RefreshFailure::Compromised {
                rotation_chain,
                error,
            }) => {
                tracing::warn!(
                    session_id = %session_id,
                    rotation_chain = %rotation_chain,
                    error = %error,
                    "refresh rejected, revoking rotation chain"
                );
                self.store
                    .revoke_chain(rotation_chain, Some(unit.as_mut()))
                    .await?;
                unit.commit().await?;
                Err(error)
            }
            Err(RefreshFailure::Fail(error)) => {
                if let Err(rollback_error) = unit.rollback().await {
                    tracing::error!(
                        error = %rollback_error,
                        "rollback failed after refresh error"
                    );
                }
                Err(error)
            }
        }
    }

    async fn rotate_in_unit(
        &self,
        session_id: Uuid,
        device_info: &str,
        unit: &mut dyn TransactionUnit,
    ) -> Result<(RefreshSession, TokenPair), RefreshFailure> {
        let session = self
            .store
            .find_by_id(session_id, Some(&mut *unit))
            .await
            .map_err(RefreshFailure::Fail)?
            // an unknown session reads the same as a forged token
            .ok_or_else(|| {
                RefreshFailure::Fail(DomainError::Token(TokenError::InvalidRefreshToken))
            })?;

        if !session.is_active() {
            return Err(RefreshFailure::Compromised {
                rotation_chain: session.rotation_chain,
                error: SessionError::ReplayDetected.into(),
            });
        }
        if session.is_expired(self.clock.now()) {
            return Err(RefreshFailure::Fail(TokenError::TokenExpired.into()));
        }
        if session.device_fingerprint != device_info {
            if self.config.strict_device_binding {
                return Err(RefreshFailure::Compromised {
                    rotation_chain: session.rotation_chain,
                    error: SessionError::DeviceMismatch.into(),
                });
            }
            tracing::warn!(
                session_id = %session.id,
                "device descriptor changed across refresh"
            );
        }

        match self
            .store
            .rotate(session_id, device_info, Some(&mut *unit))
            .await
        {
            Ok(successor) => {
                let pair = self
                    .sign_pair(successor.user_id, &successor)
                    .map_err(RefreshFailure::Fail)?;
                Ok((successor, pair))
            }
            Err(error @ DomainError::Session(SessionError::ConcurrentModification)) => {
                Err(RefreshFailure::Compromised {
                    rotation_chain: session.rotation_chain,
                    error,
                })
            }
            Err(error) => Err(RefreshFailure::Fail(error)),
        }
    }

    /// Revokes the session behind a refresh token (explicit logout)
    ///
    /// Only the presented session is revoked; other devices of the same
    /// user keep their chains.
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        let claims = self.signer.verify(refresh_token, TokenKind::Refresh)?;
        let session_id = claims
            .subject_id()
            .map_err(|_| DomainError::Token(TokenError::InvalidClaims))?;

        let revoked = self.store.revoke(session_id, None).await?;
        if !revoked {
            // an unknown session reads the same as a forged token
            return Err(DomainError::Token(TokenError::InvalidRefreshToken));
        }

        tracing::info!(session_id = %session_id, "revoked session on logout");
        Ok(())
    }

    /// Verifies an access token and returns its claims
    pub fn verify_access_token(&self, token: &str) -> DomainResult<Claims> {
        self.signer.verify(token, TokenKind::Access)
    }

    /// Revokes every session of every chain owned by a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions revoked
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> DomainResult<usize> {
        let revoked = self.store.revoke_all_for_user(user_id, None).await?;
        tracing::info!(user_id = %user_id, revoked, "revoked all sessions for user");
        Ok(revoked)
    }

    /// Deletes sessions whose expiry has passed
    pub async fn purge_expired_sessions(&self) -> DomainResult<usize> {
        self.store.purge_expired(None).await
    }

    fn sign_pair(&self, user_id: Uuid, session: &RefreshSession) -> DomainResult<TokenPair> {
        let (access_token, _) = self.signer.issue(
            user_id,
            TokenKind::Access,
            Duration::seconds(self.config.access_token_expiry),
        )?;
        // subject is the session id: refresh validity is re-checked against
        // live session state on every exchange
        let (refresh_token, _) = self.signer.issue(
            session.id,
            TokenKind::Refresh,
            Duration::seconds(self.config.refresh_token_expiry),
        )?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_expiry,
            self.config.refresh_token_expiry,
        ))
    }
}
