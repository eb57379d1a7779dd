//! Session store trait defining the interface for refresh session persistence.

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::domain::entities::session::RefreshSession;
use crate::errors::{DomainError, DomainResult};
use crate::transaction::TransactionUnit;

/// Store trait for RefreshSession persistence operations
///
/// Every operation accepts an optional transaction unit. When a unit is
/// supplied the operation runs inside it and the caller decides the fate of
/// the writes; when absent the store owns a short-lived unit for just that
/// call. A store implementation must never open an independent unit while
/// one was passed in.
///
/// # Security Considerations
/// - `rotate` is the rotation chain's serialization point: the status flip
///   from `active` must be a version-checked update so concurrent refresh
///   attempts against one session cannot both succeed.
/// - Sessions are never physically deleted by rotation or revocation, only
///   by [`purge_expired`](SessionStore::purge_expired).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new `active` session opening a fresh rotation chain
    ///
    /// # Arguments
    /// * `user_id` - Owning user
    /// * `device_fingerprint` - Client-supplied device descriptor, stored verbatim
    /// * `ttl` - Session lifetime; must be positive
    /// * `unit` - Optional transaction unit to join
    async fn create_session(
        &self,
        user_id: Uuid,
        device_fingerprint: &str,
        ttl: Duration,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<RefreshSession>;

    /// Find a session by its id regardless of status
    ///
    /// # Returns
    /// * `Ok(Some(RefreshSession))` - Session found
    /// * `Ok(None)` - No session with that id
    async fn find_by_id(
        &self,
        session_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Option<RefreshSession>>;

    /// Consume an `active` session and insert its successor
    ///
    /// Marks the session `rotated` via a version-checked status update and
    /// inserts a new `active` session in the same rotation chain carrying
    /// the presented fingerprint. Both writes share one unit.
    ///
    /// # Errors
    /// * [`SessionError::ConcurrentModification`](crate::errors::SessionError) -
    ///   the status flip matched zero rows: another caller consumed or
    ///   revoked the session first
    /// * [`DomainError::NotFound`] - no session with that id
    async fn rotate(
        &self,
        session_id: Uuid,
        device_fingerprint: &str,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<RefreshSession>;

    /// Mark one session `revoked`
    ///
    /// # Returns
    /// * `Ok(true)` - Session was found (revocation is idempotent)
    /// * `Ok(false)` - Session not found
    async fn revoke(
        &self,
        session_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<bool>;

    /// Mark every session in a rotation chain `revoked`; idempotent
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions whose status changed
    async fn revoke_chain(
        &self,
        rotation_chain: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize>;

    /// Mark every session of every chain owned by a user `revoked`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions whose status changed
    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize>;

    /// List every session in a rotation chain, oldest first
    async fn find_by_chain(
        &self,
        rotation_chain: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Vec<RefreshSession>>;

    /// Delete sessions whose expiry has passed
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions deleted
    async fn purge_expired(
        &self,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize>;

    /// Resolve a session that must currently be `active`
    ///
    /// # Returns
    /// * `Ok(RefreshSession)` - Session exists and is active
    /// * `Err(DomainError::NotFound)` - Session missing, rotated or revoked
    async fn get_active(
        &self,
        session_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<RefreshSession> {
        match self.find_by_id(session_id, unit).await? {
            Some(session) if session.is_active() => Ok(session),
            _ => Err(DomainError::NotFound {
                resource: "session".to_string(),
            }),
        }
    }
}
