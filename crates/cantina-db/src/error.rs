//! # Store Errors
//!
//! One error type for everything `cantina-db` returns.
//!
//! ```text
//! sqlx::Error ──► From ──► NotFound | UniqueViolation | ForeignKeyViolation
//!                          Busy | PoolExhausted | QueryFailed | ...
//!
//! CoreError ────► From ──► Domain(..)   unknown code, short stock, empty cart
//! ValidationError ───────► Domain(Validation(..))
//! ```
//!
//! `Busy` and `PoolExhausted` leave the store unchanged and may be retried;
//! see [`DbError::is_retryable`].

use cantina_core::CoreError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// SQLite primary result code for a lock that could not be taken.
const SQLITE_BUSY: &str = "5";
/// Extended code: the read snapshot went stale before the write.
const SQLITE_BUSY_SNAPSHOT: &str = "517";
/// Extended code: another connection is recovering the WAL.
const SQLITE_BUSY_RECOVERY: &str = "261";
const SQLITE_LOCKED: &str = "6";

/// Failure of a store operation.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write. The catalog turns this into
    /// `Domain(DuplicateCode)` for product codes.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// e.g. a line item pointing at a sale id that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The database was locked by another writer for longer than the busy
    /// timeout, or a read snapshot went stale before a write.
    ///
    /// Nothing was written. Safe to retry.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// The file could not be opened or created, or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// COMMIT failed for a reason other than lock contention.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// No pooled connection freed up within `connect_timeout`.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),

    /// A business rule rejected the operation (unknown product, not enough
    /// stock, duplicate code, empty cart, invalid quantity).
    #[error(transparent)]
    Domain(#[from] CoreError),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }

    /// The business rule behind this error, if any.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            DbError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

fn is_busy(code: Option<&str>, msg: &str) -> bool {
    matches!(
        code,
        Some(SQLITE_BUSY | SQLITE_BUSY_SNAPSHOT | SQLITE_BUSY_RECOVERY | SQLITE_LOCKED)
    ) || msg.contains("database is locked")
        || msg.contains("database table is locked")
}

/// Maps a driver error onto the store's variants.
///
/// Constraint failures are recognised through [`ErrorKind`]; lock contention
/// through the SQLite result code, with the message as a fallback.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let db_err = match err {
            sqlx::Error::Database(db_err) => db_err,
            sqlx::Error::RowNotFound => return DbError::not_found("Record", "unknown"),
            sqlx::Error::PoolTimedOut => return DbError::PoolExhausted,
            sqlx::Error::PoolClosed => {
                return DbError::ConnectionFailed("Pool is closed".to_string())
            }
            other => return DbError::Internal(other.to_string()),
        };

        let msg = db_err.message();
        match db_err.kind() {
            // "UNIQUE constraint failed: products.code"
            ErrorKind::UniqueViolation => {
                let field = msg
                    .strip_prefix("UNIQUE constraint failed: ")
                    .unwrap_or("unknown");
                DbError::duplicate(field, "unknown")
            }
            ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                message: msg.to_string(),
            },
            _ if is_busy(db_err.code().as_deref(), msg) => DbError::Busy(msg.to_string()),
            _ => DbError::QueryFailed(msg.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<cantina_core::ValidationError> for DbError {
    fn from(err: cantina_core::ValidationError) -> Self {
        DbError::Domain(CoreError::Validation(err))
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_detection() {
        assert!(is_busy(Some("5"), "database is locked"));
        assert!(is_busy(Some("517"), "database is locked"));
        assert!(is_busy(None, "database is locked"));
        assert!(!is_busy(Some("1"), "no such table: products"));
    }

    #[test]
    fn test_retryable() {
        assert!(DbError::Busy("locked".into()).is_retryable());
        assert!(DbError::PoolExhausted.is_retryable());
        assert!(!DbError::Domain(CoreError::EmptyCart).is_retryable());
        assert!(!DbError::QueryFailed("syntax".into()).is_retryable());
    }

    #[test]
    fn test_domain_message_is_transparent() {
        let err = DbError::from(CoreError::ProductNotFound("C100".into()));
        assert_eq!(err.to_string(), "Product not found: C100");
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::ProductNotFound(code)) if code == "C100"
        ));
    }
}
