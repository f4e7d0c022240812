//! # Repository Module
//!
//! SQLite implementations of the `giftshop-core` storage contracts.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Business-logic façade                                                  │
//! │       │                                                                 │
//! │       │  Arc<dyn GiftStorage>::update(&gift)                            │
//! │       ▼                                                                 │
//! │  GiftRepository                                                         │
//! │  ├── BEGIN                                                              │
//! │  ├── read active row          ──► none? ElementNotFound, ROLLBACK       │
//! │  ├── INSERT gift_histories    (price changed only)                      │
//! │  ├── UPDATE gifts ... WHERE is_deleted = 0                              │
//! │  └── COMMIT                   any error ──► ROLLBACK, then return it    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transactions
//! Multi-row writes open a transaction, run their statements against
//! `&mut SqliteConnection` and hand the outcome to [`finish`], which commits
//! on success and rolls back explicitly on failure. Inner steps never touch
//! the pool while the transaction is open.
//!
//! ## Available Repositories
//!
//! - [`BuyerRepository`](buyer::BuyerRepository)
//! - [`ManufacturerRepository`](manufacturer::ManufacturerRepository)
//! - [`GiftRepository`](gift::GiftRepository) - soft delete + price history
//! - [`PostRepository`](post::PostRepository) - temporal version chain
//! - [`WorkerRepository`](worker::WorkerRepository)
//! - [`SaleRepository`](sale::SaleRepository) - sale + line items aggregate
//! - [`SalaryRepository`](salary::SalaryRepository)

use giftshop_core::{CoreError, CoreResult};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::warn;

use crate::error::DbError;

pub mod buyer;
pub mod gift;
pub mod manufacturer;
pub mod post;
pub mod salary;
pub mod sale;
pub mod worker;

// =============================================================================
// Error Translation
// =============================================================================

/// Converts engine results into domain results at the repository boundary.
pub(crate) trait StorageResultExt<T> {
    /// Any failure becomes `CoreError::Storage`.
    fn storage(self, context: &str) -> CoreResult<T>;

    /// Single-column unique violations become `CoreError::ElementExists`.
    fn storage_unique(self, context: &str, value_of: impl Fn(&str) -> String) -> CoreResult<T>;
}

impl<T, E: Into<DbError>> StorageResultExt<T> for Result<T, E> {
    fn storage(self, context: &str) -> CoreResult<T> {
        self.map_err(|e| e.into().into_core(context))
    }

    fn storage_unique(self, context: &str, value_of: impl Fn(&str) -> String) -> CoreResult<T> {
        self.map_err(|e| e.into().into_core_unique(context, value_of))
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// Commits `tx` when `result` is Ok, otherwise rolls it back and returns the
/// original error.
pub(crate) async fn finish<T>(
    tx: Transaction<'_, Sqlite>,
    result: CoreResult<T>,
    context: &str,
) -> CoreResult<T> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()).into_core(context))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(context, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// Sets `is_deleted` on an active row of `table`.
///
/// Distinguishes an already deleted row (`ElementDeleted`) from an unknown
/// id (`ElementNotFound`).
pub(crate) async fn soft_delete(
    conn: &mut SqliteConnection,
    table: &str,
    id: &str,
) -> CoreResult<()> {
    let context = format!("deleting from {table}");

    let result = sqlx::query(&format!(
        "UPDATE {table} SET is_deleted = 1 WHERE id = ?1 AND is_deleted = 0"
    ))
    .bind(id)
    .execute(&mut *conn)
    .await
    .storage(&context)?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let exists: Option<bool> = sqlx::query_scalar(&format!("SELECT is_deleted FROM {table} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .storage(&context)?;

    match exists {
        Some(_) => Err(CoreError::deleted(id)),
        None => Err(CoreError::not_found(id)),
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    //! Rows most repository tests need before they can insert their own.

    use chrono::{DateTime, TimeZone, Utc};
    use giftshop_core::*;

    use crate::pool::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    pub async fn manufacturer(db: &Database, name: &str) -> Manufacturer {
        let m = Manufacturer::new(name);
        db.manufacturers().add(&m).await.unwrap();
        m
    }

    pub async fn gift(db: &Database, name: &str, manufacturer_id: &str, cents: i64) -> Gift {
        let g = Gift::new(name, GiftType::Accessories, manufacturer_id, Money::from_cents(cents));
        db.gifts().add(&g).await.unwrap();
        g
    }

    pub async fn post(db: &Database, name: &str) -> Post {
        let p = Post::new(name, PostType::Assistant, Money::from_cents(50_000));
        db.posts().add(&p).await.unwrap();
        p
    }

    pub async fn worker(db: &Database, fio: &str, post_id: &str) -> Worker {
        let w = Worker::new(fio, post_id, at(1990, 5, 1), at(2015, 9, 1));
        db.workers().add(&w).await.unwrap();
        w
    }

    pub async fn buyer(db: &Database, fio: &str, phone: &str) -> Buyer {
        let b = Buyer::new(fio, phone, 5.0);
        db.buyers().add(&b).await.unwrap();
        b
    }
}
