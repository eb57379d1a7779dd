//! Mock transaction manager for testing
//!
//! The mock unit keeps an undo log. In-memory repositories register an undo
//! action for every write they perform through the unit, so `rollback` (or a
//! drop without release) genuinely unwinds their state and tests can assert
//! all-or-nothing behavior without a database.

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{DomainError, DomainResult};

use super::{TransactionManager, TransactionUnit};

type UndoFn = Box<dyn FnOnce() + Send>;

/// Mock transaction manager for testing
#[derive(Default)]
pub struct MockTransactionManager {
    begun: AtomicUsize,
    committed: Arc<AtomicUsize>,
    rolled_back: Arc<AtomicUsize>,
    exhausted: AtomicBool,
}

impl MockTransactionManager {
    /// Create a new mock manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `begin` fail as if the pool were saturated
    pub fn set_exhausted(&self, exhausted: bool) {
        self.exhausted.store(exhausted, Ordering::SeqCst);
    }

    /// Number of units opened so far
    pub fn begun_count(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    /// Number of units committed so far
    pub fn committed_count(&self) -> usize {
        self.committed.load(Ordering::SeqCst)
    }

    /// Number of units rolled back so far (explicitly or by drop)
    pub fn rolled_back_count(&self) -> usize {
        self.rolled_back.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self, read_only: bool) -> DomainResult<Box<dyn TransactionUnit>> {
        if self.exhausted.load(Ordering::SeqCst) {
            return Err(DomainError::ResourceExhausted);
        }

        self.begun.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockTransactionUnit {
            undo: Vec::new(),
            read_only,
            released: false,
            committed: Arc::clone(&self.committed),
            rolled_back: Arc::clone(&self.rolled_back),
        }))
    }
}

/// Mock transaction unit carrying an undo log
pub struct MockTransactionUnit {
    undo: Vec<UndoFn>,
    read_only: bool,
    released: bool,
    committed: Arc<AtomicUsize>,
    rolled_back: Arc<AtomicUsize>,
}

impl MockTransactionUnit {
    /// Register an action that reverses a write if this unit rolls back
    pub fn push_undo(&mut self, undo: impl FnOnce() + Send + 'static) {
        self.undo.push(Box::new(undo));
    }

    /// Whether this unit was opened read-only
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn unwind(&mut self) {
        for undo in self.undo.drain(..).rev() {
            undo();
        }
    }
}

#[async_trait]
impl TransactionUnit for MockTransactionUnit {
    async fn commit(mut self: Box<Self>) -> DomainResult<()> {
        self.undo.clear();
        self.released = true;
        self.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> DomainResult<()> {
        self.unwind();
        self.released = true;
        self.rolled_back.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for MockTransactionUnit {
    fn drop(&mut self) {
        // dropped without release: behave like a rollback
        if !self.released {
            self.unwind();
            self.rolled_back.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commit_keeps_writes() {
        let manager = MockTransactionManager::new();
        let flag = Arc::new(AtomicBool::new(true));

        let mut unit = manager.begin(false).await.unwrap();
        {
            let mock = unit.as_any().downcast_mut::<MockTransactionUnit>().unwrap();
            let flag = Arc::clone(&flag);
            mock.push_undo(move || flag.store(false, Ordering::SeqCst));
        }
        unit.commit().await.unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(manager.committed_count(), 1);
        assert_eq!(manager.rolled_back_count(), 0);
    }

    #[tokio::test]
    async fn test_rollback_runs_undo_log() {
        let manager = MockTransactionManager::new();
        let flag = Arc::new(AtomicBool::new(true));

        let mut unit = manager.begin(false).await.unwrap();
        {
            let mock = unit.as_any().downcast_mut::<MockTransactionUnit>().unwrap();
            let flag = Arc::clone(&flag);
            mock.push_undo(move || flag.store(false, Ordering::SeqCst));
        }
        unit.rollback().await.unwrap();

        assert!(!flag.load(Ordering::SeqCst));
        assert_eq!(manager.rolled_back_count(), 1);
    }

    #[tokio::test]
    async fn test_drop_without_release_rolls_back() {
        let manager = MockTransactionManager::new();
        let flag = Arc::new(AtomicBool::new(true));

        {
            let mut unit = manager.begin(false).await.unwrap();
            let mock = unit.as_any().downcast_mut::<MockTransactionUnit>().unwrap();
            let flag = Arc::clone(&flag);
            mock.push_undo(move || flag.store(false, Ordering::SeqCst));
        }

        assert!(!flag.load(Ordering::SeqCst));
        assert_eq!(manager.rolled_back_count(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_pool_fails_begin() {
        let manager = MockTransactionManager::new();
        manager.set_exhausted(true);

        let result = manager.begin(false).await;
        assert!(matches!(result, Err(DomainError::ResourceExhausted)));
        assert_eq!(manager.begun_count(), 0);
    }

    #[tokio::test]
    async fn test_read_only_flag_is_visible() {
        let manager = MockTransactionManager::new();
        let mut unit = manager.begin(true).await.unwrap();
        let mock = unit.as_any().downcast_mut::<MockTransactionUnit>().unwrap();
        assert!(mock.is_read_only());
        unit.commit().await.unwrap();
    }
}
