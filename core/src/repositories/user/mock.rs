//! In-memory implementation of UserRepository for testing

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainResult};
use crate::transaction::{MockTransactionUnit, TransactionUnit};

use super::r#trait::UserRepository;

/// Mock user repository for testing
#[derive(Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<HashMap<Uuid, User>>>,
}

impl MockUserRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_email(
        &self,
        email: &str,
        _unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(
        &self,
        user: &User,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<()> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::UserAlreadyExists.into());
        }
        users.insert(user.id, user.clone());
        drop(users);

        if let Some(unit) = unit {
            if let Some(mock) = unit.as_any().downcast_mut::<MockTransactionUnit>() {
                let users = Arc::clone(&self.users);
                let user_id = user.id;
                mock.push_undo(move || {
                    users.lock().unwrap().remove(&user_id);
                });
            }
        }

        Ok(())
    }
}
