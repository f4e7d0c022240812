//! # Gift Repository
//!
//! Gifts are soft-deleted. Name uniqueness only applies to non-deleted gifts
//! (partial unique index), so a deleted gift's name can be reused.
//!
//! ## Price History
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update(gift { price: 12 })            one transaction                  │
//! │                                                                         │
//! │  SELECT active gift ──► none ──► ElementNotFound                        │
//! │       │                                                                 │
//! │       ├── stored.price == 12 ──► (no history row)                       │
//! │       └── stored.price != 12 ──► INSERT gift_histories(old_price)       │
//! │       │                                                                 │
//! │  UPDATE gifts ... WHERE is_deleted = 0 AND price = stored.price         │
//! │       │                                                                 │
//! │  COMMIT (or ROLLBACK: history row and update vanish together)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use giftshop_core::{CoreError, CoreResult, Gift, GiftFilter, GiftHistory, GiftStorage};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::{finish, soft_delete, StorageResultExt};
use crate::error::DbError;

/// Repository for gift database operations.
#[derive(Debug, Clone)]
pub struct GiftRepository {
    pool: SqlitePool,
}

impl GiftRepository {
    /// Creates a new GiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        GiftRepository { pool }
    }
}

async fn active_gift(conn: &mut SqliteConnection, id: &str) -> CoreResult<Option<Gift>> {
    sqlx::query_as::<_, Gift>(
        r#"
        SELECT id, name, gift_type, manufacturer_id, price, is_deleted
        FROM gifts
        WHERE id = ?1 AND is_deleted = 0
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .storage("reading gift")
}

async fn update_with_history(conn: &mut SqliteConnection, gift: &Gift) -> CoreResult<()> {
    let stored = active_gift(conn, &gift.id)
        .await?
        .ok_or_else(|| CoreError::not_found(&gift.id))?;

    if stored.price != gift.price {
        debug!(id = %gift.id, old_price = %stored.price, new_price = %gift.price, "Recording price change");

        sqlx::query(
            "INSERT INTO gift_histories (gift_id, old_price, change_date) VALUES (?1, ?2, ?3)",
        )
        .bind(&gift.id)
        .bind(stored.price)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .storage("recording gift price history")?;
    }

    let result = sqlx::query(
        r#"
        UPDATE gifts
        SET name = ?2, gift_type = ?3, manufacturer_id = ?4, price = ?5
        WHERE id = ?1 AND is_deleted = 0 AND price = ?6
        "#,
    )
    .bind(&gift.id)
    .bind(&gift.name)
    .bind(gift.gift_type)
    .bind(&gift.manufacturer_id)
    .bind(gift.price)
    .bind(stored.price)
    .execute(&mut *conn)
    .await
    .storage_unique("updating gift", |_| gift.name.clone())?;

    if result.rows_affected() == 0 {
        return Err(DbError::TransactionFailed(format!(
            "gift {} was modified concurrently",
            gift.id
        ))
        .into_core("updating gift"));
    }
    Ok(())
}

#[async_trait]
impl GiftStorage for GiftRepository {
    async fn list(&self, filter: &GiftFilter) -> CoreResult<Vec<Gift>> {
        debug!(?filter, "Listing gifts");

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, name, gift_type, manufacturer_id, price, is_deleted FROM gifts WHERE 1 = 1",
        );
        if filter.only_active {
            query.push(" AND is_deleted = 0");
        }
        if let Some(manufacturer_id) = &filter.manufacturer_id {
            query
                .push(" AND manufacturer_id = ")
                .push_bind(manufacturer_id.clone());
        }
        query.push(" ORDER BY name");

        query
            .build_query_as::<Gift>()
            .fetch_all(&self.pool)
            .await
            .storage("listing gifts")
    }

    async fn get_history(&self, gift_id: &str) -> CoreResult<Vec<GiftHistory>> {
        sqlx::query_as::<_, GiftHistory>(
            r#"
            SELECT gift_id, old_price, change_date
            FROM gift_histories
            WHERE gift_id = ?1
            ORDER BY change_date DESC, id DESC
            "#,
        )
        .bind(gift_id)
        .fetch_all(&self.pool)
        .await
        .storage("reading gift history")
    }

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Gift>> {
        let mut conn = self.pool.acquire().await.storage("acquiring connection")?;
        active_gift(&mut *conn, id).await
    }

    async fn get_by_name(&self, name: &str) -> CoreResult<Option<Gift>> {
        sqlx::query_as::<_, Gift>(
            r#"
            SELECT id, name, gift_type, manufacturer_id, price, is_deleted
            FROM gifts
            WHERE name = ?1 AND is_deleted = 0
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .storage("reading gift")
    }

    async fn add(&self, gift: &Gift) -> CoreResult<()> {
        debug!(id = %gift.id, name = %gift.name, price = %gift.price, "Inserting gift");

        sqlx::query(
            r#"
            INSERT INTO gifts (id, name, gift_type, manufacturer_id, price, is_deleted)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)
            "#,
        )
        .bind(&gift.id)
        .bind(&gift.name)
        .bind(gift.gift_type)
        .bind(&gift.manufacturer_id)
        .bind(gift.price)
        .execute(&self.pool)
        .await
        .storage_unique("adding gift", |field| match field {
            "name" => gift.name.clone(),
            _ => gift.id.clone(),
        })?;

        Ok(())
    }

    async fn update(&self, gift: &Gift) -> CoreResult<()> {
        debug!(id = %gift.id, name = %gift.name, price = %gift.price, "Updating gift");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = update_with_history(&mut *tx, gift).await;
        finish(tx, result, "updating gift").await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        debug!(id = %id, "Deleting gift");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = soft_delete(&mut *tx, "gifts", id).await;
        finish(tx, result, "deleting gift").await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use giftshop_core::{GiftType, Money};

    #[tokio::test]
    async fn test_price_history_only_on_change() {
        let db = fixtures::database().await;
        let acme = fixtures::manufacturer(&db, "Acme").await;
        let mut mug = fixtures::gift(&db, "Mug", &acme.id, 1000).await;
        let repo = db.gifts();

        mug.price = Money::from_cents(1200);
        repo.update(&mug).await.unwrap();

        let history = repo.get_history(&mug.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_price, Money::from_cents(1000));

        repo.update(&mug).await.unwrap();
        assert_eq!(repo.get_history(&mug.id).await.unwrap().len(), 1);

        let stored = repo.get_by_id(&mug.id).await.unwrap().unwrap();
        assert_eq!(stored.price, Money::from_cents(1200));
    }

    #[tokio::test]
    async fn test_history_is_most_recent_first() {
        let db = fixtures::database().await;
        let acme = fixtures::manufacturer(&db, "Acme").await;
        let mut mug = fixtures::gift(&db, "Mug", &acme.id, 1000).await;
        let repo = db.gifts();

        for cents in [1100, 1200, 1300] {
            mug.price = Money::from_cents(cents);
            repo.update(&mug).await.unwrap();
        }

        let old_prices: Vec<i64> = repo
            .get_history(&mug.id)
            .await
            .unwrap()
            .iter()
            .map(|h| h.old_price.cents())
            .collect();
        assert_eq!(old_prices, vec![1200, 1100, 1000]);
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_history() {
        let db = fixtures::database().await;
        let acme = fixtures::manufacturer(&db, "Acme").await;
        fixtures::gift(&db, "Cup", &acme.id, 500).await;
        let mut mug = fixtures::gift(&db, "Mug", &acme.id, 1000).await;

        mug.name = "Cup".to_string();
        mug.price = Money::from_cents(1500);
        let err = db.gifts().update(&mug).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementExists { ref field, .. } if field == "name"));

        assert!(db.gifts().get_history(&mug.id).await.unwrap().is_empty());
        let stored = db.gifts().get_by_id(&mug.id).await.unwrap().unwrap();
        assert_eq!(stored.price, Money::from_cents(1000));
        assert_eq!(stored.name, "Mug");
    }

    #[tokio::test]
    async fn test_name_unique_among_active_only() {
        let db = fixtures::database().await;
        let acme = fixtures::manufacturer(&db, "Acme").await;
        let first = fixtures::gift(&db, "Mug", &acme.id, 1000).await;

        let err = db
            .gifts()
            .add(&Gift::new("Mug", GiftType::Art, &acme.id, Money::from_cents(900)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ElementExists { ref value, .. } if value == "Mug"));

        db.gifts().delete(&first.id).await.unwrap();
        let second = fixtures::gift(&db, "Mug", &acme.id, 900).await;

        assert_eq!(db.gifts().get_by_name("Mug").await.unwrap().map(|g| g.id), Some(second.id));
    }

    #[tokio::test]
    async fn test_add_never_stores_deleted() {
        let db = fixtures::database().await;
        let acme = fixtures::manufacturer(&db, "Acme").await;
        let mut gift = Gift::new("Mug", GiftType::Art, &acme.id, Money::from_cents(900));
        gift.is_deleted = true;

        db.gifts().add(&gift).await.unwrap();
        let stored = db.gifts().get_by_id(&gift.id).await.unwrap().unwrap();
        assert!(!stored.is_deleted);
    }

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let db = fixtures::database().await;
        let acme = fixtures::manufacturer(&db, "Acme").await;
        let mut mug = fixtures::gift(&db, "Mug", &acme.id, 1000).await;

        db.gifts().delete(&mug.id).await.unwrap();
        assert_eq!(db.gifts().get_by_id(&mug.id).await.unwrap(), None);

        let err = db.gifts().delete(&mug.id).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementDeleted { .. }));

        mug.price = Money::from_cents(2000);
        let err = db.gifts().update(&mug).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementNotFound { .. }));

        let err = db.gifts().delete(&giftshop_core::new_id()).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = fixtures::database().await;
        let acme = fixtures::manufacturer(&db, "Acme").await;
        let globex = fixtures::manufacturer(&db, "Globex").await;
        let mug = fixtures::gift(&db, "Mug", &acme.id, 1000).await;
        fixtures::gift(&db, "Cup", &acme.id, 500).await;
        fixtures::gift(&db, "Toy", &globex.id, 700).await;
        db.gifts().delete(&mug.id).await.unwrap();

        let repo = db.gifts();
        assert_eq!(repo.list(&GiftFilter::new()).await.unwrap().len(), 2);
        assert_eq!(repo.list(&GiftFilter::new().include_deleted()).await.unwrap().len(), 3);

        let acme_active = repo.list(&GiftFilter::new().manufacturer(&acme.id)).await.unwrap();
        assert_eq!(acme_active.len(), 1);
        assert_eq!(acme_active[0].name, "Cup");
    }
}
