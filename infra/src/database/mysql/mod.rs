//! MySQL implementations of the core persistence traits.

mod session_store_impl;
mod user_repository_impl;

pub use session_store_impl::MySqlSessionStore;
pub use user_repository_impl::MySqlUserRepository;

use sqlx::mysql::MySqlDatabaseError;

/// ER_DUP_ENTRY: a unique-key violation
pub(crate) fn is_duplicate_key(error: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = error {
        if let Some(mysql_error) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_error.number() == 1062;
        }
    }
    false
}
