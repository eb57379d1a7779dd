//! MySQL transaction manager and unit
//!
//! Each unit exclusively owns one pooled connection and drives the
//! transaction with explicit `START TRANSACTION [READ ONLY]` / `COMMIT` /
//! `ROLLBACK` statements. Managing the statements directly (instead of
//! wrapping `sqlx::Transaction`) is what allows read-only units: MySQL only
//! accepts the READ ONLY characteristic at transaction start.
//!
//! A unit dropped without being released rolls back before its connection
//! rejoins the pool, so a cancelled caller cannot leak a half-open
//! transaction.

use std::any::Any;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{MySql, MySqlConnection, MySqlPool};

use tk_core::errors::{DomainError, DomainResult};
use tk_core::transaction::{TransactionManager, TransactionUnit};

/// Maps pool acquisition and statement errors into domain errors
pub(crate) fn map_db_error(error: sqlx::Error) -> DomainError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DomainError::ResourceExhausted,
        other => DomainError::Database {
            message: other.to_string(),
        },
    }
}

/// Transaction manager over the MySQL connection pool
pub struct SqlTransactionManager {
    pool: MySqlPool,
}

impl SqlTransactionManager {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for SqlTransactionManager {
    async fn begin(&self, read_only: bool) -> DomainResult<Box<dyn TransactionUnit>> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;

        let statement = if read_only {
            "START TRANSACTION READ ONLY"
        } else {
            "START TRANSACTION"
        };
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(Box::new(SqlTransactionUnit { conn: Some(conn) }))
    }
}

/// Transaction unit owning one pooled MySQL connection
pub struct SqlTransactionUnit {
    conn: Option<PoolConnection<MySql>>,
}

impl SqlTransactionUnit {
    /// The connection this unit's statements run on
    pub(crate) fn connection(&mut self) -> DomainResult<&mut MySqlConnection> {
        self.conn.as_deref_mut().ok_or_else(|| DomainError::Internal {
            message: "transaction unit already released".to_string(),
        })
    }

    async fn release(mut self: Box<Self>, statement: &str) -> DomainResult<()> {
        let mut conn = self.conn.take().ok_or_else(|| DomainError::Internal {
            message: "transaction unit already released".to_string(),
        })?;
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }
}

#[async_trait]
impl TransactionUnit for SqlTransactionUnit {
    async fn commit(self: Box<Self>) -> DomainResult<()> {
        self.release("COMMIT").await
    }

    async fn rollback(self: Box<Self>) -> DomainResult<()> {
        self.release("ROLLBACK").await
    }

    fn as_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for SqlTransactionUnit {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        if let Err(error) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                            tracing::error!(
                                %error,
                                "rollback of dropped transaction unit failed"
                            );
                        }
                    });
                }
                Err(_) => {
                    // no runtime left; the connection is torn down instead
                    // of returning to the pool with an open transaction
                    tracing::warn!("transaction unit dropped outside a runtime, closing connection");
                }
            }
        }
    }
}

/// Resolves the concrete connection behind a passed-in transaction unit
///
/// Fails if the unit was produced by a different manager implementation;
/// units and stores must come from the same backing database.
pub(crate) fn unit_connection<'a>(
    unit: &'a mut dyn TransactionUnit,
) -> DomainResult<&'a mut MySqlConnection> {
    let unit = unit
        .as_any()
        .downcast_mut::<SqlTransactionUnit>()
        .ok_or_else(|| DomainError::Internal {
            message: "transaction unit does not belong to this database".to_string(),
        })?;
    unit.connection()
}
