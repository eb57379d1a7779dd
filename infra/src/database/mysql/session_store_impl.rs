//! MySQL implementation of the SessionStore trait.
//!
//! Rotation is serialized by the database itself: the `active -> rotated`
//! transition is a status-guarded UPDATE, so of two concurrent refresh
//! attempts against one session exactly one sees the row change and the
//! other observes zero affected rows. No application-level lock is involved.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlConnection, MySqlPool, Row};
use uuid::Uuid;

use tk_core::clock::Clock;
use tk_core::domain::entities::session::{RefreshSession, SessionStatus};
use tk_core::errors::{DomainError, DomainResult, SessionError};
use tk_core::repositories::SessionStore;
use tk_core::transaction::TransactionUnit;

use crate::database::tx::{map_db_error, unit_connection};

/// MySQL implementation of SessionStore
pub struct MySqlSessionStore {
    pool: MySqlPool,
    clock: Arc<dyn Clock>,
}

impl MySqlSessionStore {
    /// Create a new MySQL session store
    pub fn new(pool: MySqlPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Convert a database row to a RefreshSession entity
    fn row_to_session(row: &MySqlRow) -> DomainResult<RefreshSession> {
        let id: String = row.try_get("id").map_err(map_db_error)?;
        let user_id: String = row.try_get("user_id").map_err(map_db_error)?;
        let rotation_chain: String = row.try_get("rotation_chain").map_err(map_db_error)?;
        let status: String = row.try_get("status").map_err(map_db_error)?;

        Ok(RefreshSession {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("invalid session id: {e}"),
            })?,
            user_id: Uuid::parse_str(&user_id).map_err(|e| DomainError::Internal {
                message: format!("invalid user id: {e}"),
            })?,
            device_fingerprint: row.try_get("device_fingerprint").map_err(map_db_error)?,
            rotation_chain: Uuid::parse_str(&rotation_chain).map_err(|e| {
                DomainError::Internal {
                    message: format!("invalid rotation chain id: {e}"),
                }
            })?,
            status: SessionStatus::from_str(&status).map_err(|e| DomainError::Internal {
                message: e,
            })?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(map_db_error)?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(map_db_error)?,
        })
    }

    async fn insert_session(
        conn: &mut MySqlConnection,
        session: &RefreshSession,
    ) -> DomainResult<()> {
        let query = r#"
            INSERT INTO refresh_sessions (
                id, user_id, device_fingerprint, rotation_chain, status, created_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(session.id.to_string())
            .bind(session.user_id.to_string())
            .bind(&session.device_fingerprint)
            .bind(session.rotation_chain.to_string())
            .bind(session.status.as_str())
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(conn)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    async fn fetch_session(
        conn: &mut MySqlConnection,
        session_id: Uuid,
    ) -> DomainResult<Option<RefreshSession>> {
        let query = r#"
            SELECT id, user_id, device_fingerprint, rotation_chain, status, created_at, expires_at
            FROM refresh_sessions
            WHERE id = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(session_id.to_string())
            .fetch_optional(conn)
            .await
            .map_err(map_db_error)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    /// Consume the session and insert its successor on one connection
    async fn rotate_on(
        &self,
        conn: &mut MySqlConnection,
        session_id: Uuid,
        device_fingerprint: &str,
    ) -> DomainResult<RefreshSession> {
        let session = Self::fetch_session(&mut *conn, session_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: "session".to_string(),
            })?;

        // the serialization point: only one caller can flip active -> rotated
        let consumed = sqlx::query(
            "UPDATE refresh_sessions SET status = 'rotated' WHERE id = ? AND status = 'active'",
        )
        .bind(session_id.to_string())
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        if consumed.rows_affected() == 0 {
            return Err(SessionError::ConcurrentModification.into());
        }

        let successor = session.successor(device_fingerprint, self.clock.now());
        Self::insert_session(conn, &successor).await?;
        Ok(successor)
    }
}

#[async_trait]
impl SessionStore for MySqlSessionStore {
    async fn create_session(
        &self,
        user_id: Uuid,
        device_fingerprint: &str,
        ttl: Duration,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<RefreshSession> {
        if ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "session ttl must be positive".to_string(),
            });
        }

        let session = RefreshSession::new(user_id, device_fingerprint, self.clock.now(), ttl);
        match unit {
            Some(unit) => Self::insert_session(unit_connection(unit)?, &session).await?,
            None => {
                let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
                Self::insert_session(&mut conn, &session).await?;
            }
        }
        Ok(session)
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Option<RefreshSession>> {
        match unit {
            Some(unit) => Self::fetch_session(unit_connection(unit)?, session_id).await,
            None => {
                let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
                Self::fetch_session(&mut conn, session_id).await
            }
        }
    }

    async fn rotate(
        &self,
        session_id: Uuid,
        device_fingerprint: &str,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<RefreshSession> {
        match unit {
            Some(unit) => {
                self.rotate_on(unit_connection(unit)?, session_id, device_fingerprint)
                    .await
            }
            None => {
                // the two writes must still be atomic without a caller unit
                let mut tx = self.pool.begin().await.map_err(map_db_error)?;
                let successor = self
                    .rotate_on(&mut tx, session_id, device_fingerprint)
                    .await?;
                tx.commit().await.map_err(map_db_error)?;
                Ok(successor)
            }
        }
    }

    async fn revoke(
        &self,
        session_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<bool> {
        let update =
            "UPDATE refresh_sessions SET status = 'revoked' WHERE id = ? AND status != 'revoked'";
        let exists = "SELECT EXISTS(SELECT 1 FROM refresh_sessions WHERE id = ?) AS found";

        let id = session_id.to_string();
        match unit {
            Some(unit) => {
                let conn = unit_connection(unit)?;
                let changed = sqlx::query(update)
                    .bind(&id)
                    .execute(&mut *conn)
                    .await
                    .map_err(map_db_error)?;
                if changed.rows_affected() > 0 {
                    return Ok(true);
                }
                let row = sqlx::query(exists)
                    .bind(&id)
                    .fetch_one(conn)
                    .await
                    .map_err(map_db_error)?;
                let found: i8 = row.try_get("found").map_err(map_db_error)?;
                Ok(found == 1)
            }
            None => {
                let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
                let changed = sqlx::query(update)
                    .bind(&id)
                    .execute(&mut *conn)
                    .await
                    .map_err(map_db_error)?;
                if changed.rows_affected() > 0 {
                    return Ok(true);
                }
                let row = sqlx::query(exists)
                    .bind(&id)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(map_db_error)?;
                let found: i8 = row.try_get("found").map_err(map_db_error)?;
                Ok(found == 1)
            }
        }
    }

    async fn revoke_chain(
        &self,
        rotation_chain: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize> {
        let query = r#"
            UPDATE refresh_sessions
            SET status = 'revoked'
            WHERE rotation_chain = ? AND status != 'revoked'
        "#;

        let q = sqlx::query(query).bind(rotation_chain.to_string());
        let result = match unit {
            Some(unit) => q.execute(unit_connection(unit)?).await,
            None => q.execute(&self.pool).await,
        }
        .map_err(map_db_error)?;

        Ok(result.rows_affected() as usize)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize> {
        let query = r#"
            UPDATE refresh_sessions
            SET status = 'revoked'
            WHERE user_id = ? AND status != 'revoked'
        "#;

        let q = sqlx::query(query).bind(user_id.to_string());
        let result = match unit {
            Some(unit) => q.execute(unit_connection(unit)?).await,
            None => q.execute(&self.pool).await,
        }
        .map_err(map_db_error)?;

        Ok(result.rows_affected() as usize)
    }

    async fn find_by_chain(
        &self,
        rotation_chain: Uuid,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<Vec<RefreshSession>> {
        let query = r#"
            SELECT id, user_id, device_fingerprint, rotation_chain, status, created_at, expires_at
            FROM refresh_sessions
            WHERE rotation_chain = ?
            ORDER BY created_at ASC
        "#;

        let q = sqlx::query(query).bind(rotation_chain.to_string());
        let rows = match unit {
            Some(unit) => q.fetch_all(unit_connection(unit)?).await,
            None => q.fetch_all(&self.pool).await,
        }
        .map_err(map_db_error)?;

        rows.iter().map(Self::row_to_session).collect()
    }

    async fn purge_expired(
        &self,
        unit: Option<&mut dyn TransactionUnit>,
    ) -> DomainResult<usize> {
        let query = "DELETE FROM refresh_sessions WHERE expires_at <= ?";

        let q = sqlx::query(query).bind(self.clock.now());
        let result = match unit {
            Some(unit) => q.execute(unit_connection(unit)?).await,
            None => q.execute(&self.pool).await,
        }
        .map_err(map_db_error)?;

        Ok(result.rows_affected() as usize)
    }
}
