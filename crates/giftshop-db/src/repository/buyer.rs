//! # Buyer Repository
//!
//! Buyers are hard-deleted. Their sales survive with `buyer_id` cleared in
//! the same transaction.

use async_trait::async_trait;
use giftshop_core::{Buyer, BuyerStorage, CoreError, CoreResult};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{finish, StorageResultExt};

/// Repository for buyer database operations.
#[derive(Debug, Clone)]
pub struct BuyerRepository {
    pool: SqlitePool,
}

impl BuyerRepository {
    /// Creates a new BuyerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BuyerRepository { pool }
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> CoreResult<Option<Buyer>> {
        let sql = format!(
            "SELECT id, fio, phone_number, discount_size FROM buyers WHERE {column} = ?1 LIMIT 1"
        );
        sqlx::query_as::<_, Buyer>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .storage("reading buyer")
    }
}

async fn detach_and_delete(conn: &mut SqliteConnection, id: &str) -> CoreResult<()> {
    let detached = sqlx::query("UPDATE sales SET buyer_id = NULL WHERE buyer_id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .storage("detaching buyer sales")?;

    debug!(buyer_id = %id, sales = detached.rows_affected(), "Detached sales from buyer");

    let deleted = sqlx::query("DELETE FROM buyers WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .storage("deleting buyer")?;

    if deleted.rows_affected() == 0 {
        return Err(CoreError::not_found(id));
    }
    Ok(())
}

#[async_trait]
impl BuyerStorage for BuyerRepository {
    async fn list(&self) -> CoreResult<Vec<Buyer>> {
        debug!("Listing buyers");

        sqlx::query_as::<_, Buyer>(
            "SELECT id, fio, phone_number, discount_size FROM buyers ORDER BY fio",
        )
        .fetch_all(&self.pool)
        .await
        .storage("listing buyers")
    }

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Buyer>> {
        self.fetch_one_where("id", id).await
    }

    async fn get_by_fio(&self, fio: &str) -> CoreResult<Option<Buyer>> {
        self.fetch_one_where("fio", fio).await
    }

    async fn get_by_phone_number(&self, phone_number: &str) -> CoreResult<Option<Buyer>> {
        self.fetch_one_where("phone_number", phone_number).await
    }

    async fn add(&self, buyer: &Buyer) -> CoreResult<()> {
        debug!(id = %buyer.id, phone_number = %buyer.phone_number, "Inserting buyer");

        sqlx::query(
            r#"
            INSERT INTO buyers (id, fio, phone_number, discount_size)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&buyer.id)
        .bind(&buyer.fio)
        .bind(&buyer.phone_number)
        .bind(buyer.discount_size)
        .execute(&self.pool)
        .await
        .storage_unique("adding buyer", |field| match field {
            "phone_number" => buyer.phone_number.clone(),
            _ => buyer.id.clone(),
        })?;

        Ok(())
    }

    async fn update(&self, buyer: &Buyer) -> CoreResult<()> {
        debug!(id = %buyer.id, "Updating buyer");

        let result = sqlx::query(
            r#"
            UPDATE buyers
            SET fio = ?2, phone_number = ?3, discount_size = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&buyer.id)
        .bind(&buyer.fio)
        .bind(&buyer.phone_number)
        .bind(buyer.discount_size)
        .execute(&self.pool)
        .await
        .storage_unique("updating buyer", |_| buyer.phone_number.clone())?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(&buyer.id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        debug!(id = %id, "Deleting buyer");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = detach_and_delete(&mut *tx, id).await;
        finish(tx, result, "deleting buyer").await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
