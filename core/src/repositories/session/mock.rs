//! In-memory implementation of SessionStore for testing
//!
//! Faithful to the persistent contract: rotation is a compare-and-set on
//! the status field under one lock, and writes performed through a mock
//! transaction unit register undo actions so a rollback removes them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::session::{RefreshSession, SessionStatus};
use crate::errors::{DomainError, DomainResult, SessionError};
use crate::transaction::{MockTransactionUnit, TransactionUnit};

use super::r#trait::SessionStore;

type SessionMap = Arc<Mutex<HashMap<Uuid, RefreshSession>>>;

/// Mock session store for testing
pub struct MockSessionStore {
    sessions: SessionMap,
    clock: Arc<dyn Clock>,
    fail_create: AtomicBool,
}

impl MockSessionStore {
    /// Create a new mock store reading time from the given clock
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            clock,
            fail_create: AtomicBool::new(false),
        }
    }

    /// Make the next and all subsequent `create_session` calls fail
    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Number of stored sessions, any status
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    fn register_undo(
        unit: Option<&mut dyn TransactionUnit>,
        undo: impl FnOnce() + Send + 'static,
    ) {
        if let Some(unit) = unit {
            if let Some(mock) = unit.as_any().downcast_mut::<MockTransactionUnit>() {
                mock.push_undo(undo);
            }
        }
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        device_fingerprint: &str,
        ttl: Duration,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<RefreshSession> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DomainError::Database {
                message: "simulated session insert failure".to_string(),
            });
        }
        if ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "session ttl must be positive".to_string(),
            });
        }

        let session = RefreshSession::new(user_id, device_fingerprint, self.clock.now(), ttl);
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());

        let sessions = Arc::clone(&self.sessions);
        let session_id = session.id;
        Self::register_undo(unit, move || {
            sessions.lock().unwrap().remove(&session_id);
        });

        Ok(session)
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        _unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Option<RefreshSession>> {
        Ok(self.sessions.lock().unwrap().get(&session_id).cloned())
    }

    async fn rotate(
        &self,
        session_id: Uuid,
        device_fingerprint: &str,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<RefreshSession> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().unwrap();

        let current = sessions.get_mut(&session_id).ok_or(DomainError::NotFound {
            resource: "session".to_string(),
        })?;

        // compare-and-set: only an active session can be consumed
        if !current.is_active() {
            return Err(SessionError::ConcurrentModification.into());
        }
        current.mark_rotated();
        let successor = current.successor(device_fingerprint, now);
        sessions.insert(successor.id, successor.clone());
        drop(sessions);

        let store = Arc::clone(&self.sessions);
        let successor_id = successor.id;
        Self::register_undo(unit, move || {
            let mut sessions = store.lock().unwrap();
            sessions.remove(&successor_id);
            if let Some(old) = sessions.get_mut(&session_id) {
                old.status = SessionStatus::Active;
            }
        });

        Ok(successor)
    }

    async fn revoke(
        &self,
        session_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        let previous = match sessions.get_mut(&session_id) {
            Some(session) => {
                let previous = session.status;
                session.revoke();
                previous
            }
            None => return Ok(false),
        };
        drop(sessions);

        let store = Arc::clone(&self.sessions);
        Self::register_undo(unit, move || {
            if let Some(session) = store.lock().unwrap().get_mut(&session_id) {
                session.status = previous;
            }
        });
        Ok(true)
    }

    async fn revoke_chain(
        &self,
        rotation_chain: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut previous = Vec::new();

        for session in sessions.values_mut() {
            if session.rotation_chain == rotation_chain
                && session.status != SessionStatus::Revoked
            {
                previous.push((session.id, session.status));
                session.revoke();
            }
        }
        drop(sessions);

        let changed = previous.len();
        let store = Arc::clone(&self.sessions);
        Self::register_undo(unit, move || {
            let mut sessions = store.lock().unwrap();
            for (id, status) in previous {
                if let Some(session) = sessions.get_mut(&id) {
                    session.status = status;
                }
            }
        });

        Ok(changed)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut previous = Vec::new();

        for session in sessions.values_mut() {
            if session.user_id == user_id && session.status != SessionStatus::Revoked {
                previous.push((session.id, session.status));
                session.revoke();
            }
        }
        drop(sessions);

        let changed = previous.len();
        let store = Arc::clone(&self.sessions);
        Self::register_undo(unit, move || {
            let mut sessions = store.lock().unwrap();
            for (id, status) in previous {
                if let Some(session) = sessions.get_mut(&id) {
                    session.status = status;
                }
            }
        });

        Ok(changed)
    }

    async fn find_by_chain(
        &self,
        rotation_chain: Uuid,
        _unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Vec<RefreshSession>> {
        let sessions = self.sessions.lock().unwrap();
        let mut chain: Vec<RefreshSession> = sessions
            .values()
            .filter(|s| s.rotation_chain == rotation_chain)
            .cloned()
            .collect();
        chain.sort_by_key(|s| s.created_at);
        Ok(chain)
    }

    async fn purge_expired(
        &self,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize> {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().unwrap();

        let expired: Vec<RefreshSession> = sessions
            .values()
            .filter(|s| s.is_expired(now))
            .cloned()
            .collect();
        for session in &expired {
            sessions.remove(&session.id);
        }
        drop(sessions);

        let purged = expired.len();
        let store = Arc::clone(&self.sessions);
        Self::register_undo(unit, move || {
            let mut sessions = store.lock().unwrap();
            for session in expired {
                sessions.insert(session.id, session);
            }
        });

        Ok(purged)
    }
}
