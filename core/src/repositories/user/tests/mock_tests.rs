//! Unit tests for the in-memory user repository

use chrono::Utc;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError};
use crate::repositories::user::{MockUserRepository, UserRepository};
use crate::transaction::{MockTransactionManager, TransactionManager};

fn user(email: &str) -> User {
    User::new(email, "Test User", "phc-hash", Utc::now())
}

#[tokio::test]
async fn test_create_and_find_by_email() {
    let repo = MockUserRepository::new();
    let user = user("user@example.com");

    repo.create_user(&user, None).await.unwrap();

    let found = repo
        .find_by_email("user@example.com", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);

    let missing = repo.find_by_email("other@example.com", None).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let repo = MockUserRepository::new();
    repo.create_user(&user("user@example.com"), None)
        .await
        .unwrap();

    let result = repo.create_user(&user("user@example.com"), None).await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::UserAlreadyExists))
    ));
    assert_eq!(repo.user_count(), 1);
}

#[tokio::test]
async fn test_insert_in_unit_is_undone_by_rollback() {
    let repo = MockUserRepository::new();
    let manager = MockTransactionManager::new();

    let mut unit = manager.begin(false).await.unwrap();
    repo.create_user(&user("user@example.com"), Some(unit.as_mut()))
        .await
        .unwrap();
    assert_eq!(repo.user_count(), 1);

    unit.rollback().await.unwrap();
    assert_eq!(repo.user_count(), 0);
}
