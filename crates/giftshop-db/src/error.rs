//! # Database Error Types
//!
//! Error types for database operations and their translation into the
//! domain taxonomy.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Categorized engine fault                       │
//! │       │                                                                 │
//! │       ├── UNIQUE on a natural key → CoreError::ElementExists { field }  │
//! │       │                                                                 │
//! │       └── anything else           → CoreError::Storage { context }      │
//! │                                      (DbError kept as the source)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use giftshop_core::CoreError;
use thiserror::Error;
use tracing::error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool was closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not be started, committed or rolled back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Unique constraint violation.
    ///
    /// `constraint` is what SQLite reports, e.g. `gifts.name` or
    /// `sale_gifts.sale_id, sale_gifts.gift_id`.
    #[error("Unique constraint failed: {constraint}")]
    UniqueViolation { constraint: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Deleting a manufacturer that gifts still reference
    /// - Inserting a sale for an unknown worker or gift
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Column named by a unique violation, without the table prefix.
    ///
    /// For composite keys only the first column is returned.
    pub fn unique_column(&self) -> Option<&str> {
        match self {
            DbError::UniqueViolation { constraint } => constraint
                .split(", ")
                .next()
                .map(|col| col.rsplit('.').next().unwrap_or(col)),
            _ => None,
        }
    }

    /// Wraps the fault as [`CoreError::Storage`].
    pub fn into_core(self, context: &str) -> CoreError {
        error!(context, error = %self, "Storage failure");
        CoreError::storage(context, self)
    }

    /// Like [`into_core`](Self::into_core), but a unique violation on a
    /// single column becomes [`CoreError::ElementExists`] for that field.
    ///
    /// `value_of` maps the violated column to the offending value.
    pub fn into_core_unique(self, context: &str, value_of: impl Fn(&str) -> String) -> CoreError {
        match self.unique_column() {
            Some(field) if !self.is_composite_unique() => {
                let value = value_of(field);
                CoreError::exists(field, value)
            }
            _ => self.into_core(context),
        }
    }

    fn is_composite_unique(&self) -> bool {
        matches!(self, DbError::UniqueViolation { constraint } if constraint.contains(", "))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>[, <table>.<column>]"
                // "FOREIGN KEY constraint failed"
                if let Some(constraint) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        constraint: constraint.to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        err.into_core("accessing the database")
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
