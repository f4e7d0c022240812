//! # Sale Repository
//!
//! A sale and its line items are one aggregate.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. ADD (one transaction)                                               │
//! │     └── INSERT sales                                                    │
//! │     └── INSERT sale_gifts × N     any failure ──► ROLLBACK everything   │
//! │                                                                         │
//! │  2. READ                                                                │
//! │     └── get_by_id / list return line items in insertion order           │
//! │     └── cancelled sales are still returned                              │
//! │                                                                         │
//! │  3. CANCEL                                                              │
//! │     └── is_cancel = 1             already cancelled ──► ElementDeleted  │
//! │                                                                         │
//! │  There is no update.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use giftshop_core::{CoreError, CoreResult, Sale, SaleFilter, SaleGift, SaleStorage};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::{finish, StorageResultExt};

const SALE_COLUMNS: &str =
    "id, worker_id, buyer_id, sale_date, sum, discount_type, discount, is_cancel";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }
}

/// Appends the filter's predicates to a query over `sales` that already has a
/// `WHERE` clause.
fn push_conditions(query: &mut QueryBuilder<'_, Sqlite>, filter: &SaleFilter) {
    if let Some(period) = filter.period {
        query
            .push(" AND sale_date >= ")
            .push_bind(period.from())
            .push(" AND sale_date < ")
            .push_bind(period.to());
    }
    if let Some(worker_id) = &filter.worker_id {
        query.push(" AND worker_id = ").push_bind(worker_id.clone());
    }
    if let Some(buyer_id) = &filter.buyer_id {
        query.push(" AND buyer_id = ").push_bind(buyer_id.clone());
    }
    if let Some(gift_id) = &filter.gift_id {
        query
            .push(" AND EXISTS (SELECT 1 FROM sale_gifts sg WHERE sg.sale_id = sales.id AND sg.gift_id = ")
            .push_bind(gift_id.clone())
            .push(")");
    }
}

/// Distributes line items to their sales, keeping the order of `items`.
fn attach_gifts(sales: &mut [Sale], items: Vec<SaleGift>) {
    let mut by_sale: HashMap<String, Vec<SaleGift>> = HashMap::new();
    for item in items {
        by_sale.entry(item.sale_id.clone()).or_default().push(item);
    }
    for sale in sales.iter_mut() {
        sale.gifts = by_sale.remove(&sale.id).unwrap_or_default();
    }
}

async fn insert_aggregate(conn: &mut SqliteConnection, sale: &Sale) -> CoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (id, worker_id, buyer_id, sale_date, sum, discount_type, discount, is_cancel)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.worker_id)
    .bind(&sale.buyer_id)
    .bind(sale.sale_date)
    .bind(sale.sum)
    .bind(sale.discount_type)
    .bind(sale.discount)
    .execute(&mut *conn)
    .await
    .storage("adding sale")?;

    for item in &sale.gifts {
        sqlx::query("INSERT INTO sale_gifts (sale_id, gift_id, count) VALUES (?1, ?2, ?3)")
            .bind(&sale.id)
            .bind(&item.gift_id)
            .bind(item.count)
            .execute(&mut *conn)
            .await
            .storage("adding sale gift")?;
    }

    debug!(id = %sale.id, items = sale.gifts.len(), "Sale inserted");
    Ok(())
}

async fn mark_cancelled(conn: &mut SqliteConnection, id: &str) -> CoreResult<()> {
    let result = sqlx::query("UPDATE sales SET is_cancel = 1 WHERE id = ?1 AND is_cancel = 0")
        .bind(id)
        .execute(&mut *conn)
        .await
        .storage("cancelling sale")?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    let exists: Option<bool> = sqlx::query_scalar("SELECT is_cancel FROM sales WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .storage("reading sale")?;

    match exists {
        Some(_) => Err(CoreError::deleted(id)),
        None => Err(CoreError::not_found(id)),
    }
}

#[async_trait]
impl SaleStorage for SaleRepository {
    async fn list(&self, filter: &SaleFilter) -> CoreResult<Vec<Sale>> {
        debug!(?filter, "Listing sales");

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE 1 = 1"
        ));
        push_conditions(&mut query, filter);
        query.push(" ORDER BY sale_date DESC");

        // Items go through the same predicates. Binding every sale id would
        // run into SQLite's host parameter limit on large shops.
        let mut items_query = QueryBuilder::<Sqlite>::new(
            "SELECT sale_id, gift_id, count FROM sale_gifts \
             WHERE sale_id IN (SELECT id FROM sales WHERE 1 = 1",
        );
        push_conditions(&mut items_query, filter);
        items_query.push(") ORDER BY rowid");

        let mut conn = self.pool.acquire().await.storage("acquiring connection")?;
        let mut sales = query
            .build_query_as::<Sale>()
            .fetch_all(&mut *conn)
            .await
            .storage("listing sales")?;
        if sales.is_empty() {
            return Ok(sales);
        }

        let items = items_query
            .build_query_as::<SaleGift>()
            .fetch_all(&mut *conn)
            .await
            .storage("reading sale gifts")?;
        attach_gifts(&mut sales, items);
        Ok(sales)
    }

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .storage("reading sale")?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };
        sale.gifts = sqlx::query_as::<_, SaleGift>(
            "SELECT sale_id, gift_id, count FROM sale_gifts WHERE sale_id = ?1 ORDER BY rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .storage("reading sale gifts")?;
        Ok(Some(sale))
    }

    async fn add(&self, sale: &Sale) -> CoreResult<()> {
        debug!(id = %sale.id, worker_id = %sale.worker_id, sum = %sale.sum, "Inserting sale");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = insert_aggregate(&mut *tx, sale).await;
        finish(tx, result, "adding sale").await
    }

    async fn cancel(&self, id: &str) -> CoreResult<()> {
        debug!(id = %id, "Cancelling sale");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = mark_cancelled(&mut *tx, id).await;
        finish(tx, result, "cancelling sale").await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
