//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use tk_core::domain::entities::user::User;
use tk_core::errors::{AuthError, DomainError, DomainResult};
use tk_core::repositories::UserRepository;
use tk_core::transaction::TransactionUnit;

use crate::database::mysql::is_duplicate_key;
use crate::database::tx::{map_db_error, unit_connection};

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a User entity
    fn row_to_user(row: &MySqlRow) -> DomainResult<User> {
        let id: String = row.try_get("id").map_err(map_db_error)?;

        Ok(User {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("invalid user id: {e}"),
            })?,
            email: row.try_get("email").map_err(map_db_error)?,
            name: row.try_get("name").map_err(map_db_error)?,
            password_hash: row.try_get("password_hash").map_err(map_db_error)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(map_db_error)?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(map_db_error)?,
        })
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(
        &self,
        email: &str,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Option<User>> {
        let query = r#"
            SELECT id, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE email = ?
            LIMIT 1
        "#;

        let q = sqlx::query(query).bind(email);
        let row = match unit {
            Some(unit) => q.fetch_optional(unit_connection(unit)?).await,
            None => q.fetch_optional(&self.pool).await,
        }
        .map_err(map_db_error)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_user(
        &self,
        user: &User,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<()> {
        let query = r#"
            INSERT INTO users (id, email, name, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        let q = sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at);

        let result = match unit {
            Some(unit) => q.execute(unit_connection(unit)?).await,
            None => q.execute(&self.pool).await,
        };

        result.map_err(|e| {
            if is_duplicate_key(&e) {
                AuthError::UserAlreadyExists.into()
            } else {
                map_db_error(e)
            }
        })?;

        Ok(())
    }
}
