//! Transaction coordination traits
//!
//! A [`TransactionUnit`] is a scoped handle over one database connection.
//! The caller that opened it owns it exclusively, lends it to collaborators
//! for the unit's lifetime, and releases it exactly once: `commit` on the
//! success path, `rollback` on every failure path. Implementations must also
//! roll back when a unit is dropped without being released, so a cancelled
//! caller can never leak a half-committed state.
//!
//! Repository-style collaborators never open their own unit when one is
//! supplied; their operations take `Option<&mut dyn TransactionUnit>`, and
//! absence means "own a short-lived unit for just this call".

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::{MockTransactionManager, MockTransactionUnit};

use std::any::Any;

use async_trait::async_trait;

use crate::errors::DomainResult;

/// Factory for scoped transaction units
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Opens a new transaction unit.
    ///
    /// With `read_only` set, the unit provides a consistent multi-read
    /// snapshot and rejects writes. Fails with
    /// [`DomainError::ResourceExhausted`](crate::errors::DomainError) when
    /// the underlying connection pool is saturated.
    async fn begin(&self, read_only: bool) -> DomainResult<Box<dyn TransactionUnit>>;
}

/// Scoped handle over a single connection with all-or-nothing semantics
#[async_trait]
pub trait TransactionUnit: Send {
    /// Commits every operation performed through this unit.
    async fn commit(self: Box<Self>) -> DomainResult<()>;

    /// Discards every operation performed through this unit.
    async fn rollback(self: Box<Self>) -> DomainResult<()>;

    /// Downcast hook letting a store implementation reach its own concrete
    /// unit type (and through it, the underlying connection).
    fn as_any(&mut self) -> &mut dyn Any;
}
