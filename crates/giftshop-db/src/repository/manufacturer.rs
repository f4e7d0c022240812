//! # Manufacturer Repository
//!
//! ## Rename Shift
//! ```text
//! update(name = "Acme Group")
//!
//!   before:  name = "Acme Toys"   prev = "Acme"        prev_prev = NULL
//!   after:   name = "Acme Group"  prev = "Acme Toys"   prev_prev = "Acme"
//! ```
//! Old names are searchable through `get_by_old_name`.

use async_trait::async_trait;
use giftshop_core::{CoreError, CoreResult, Manufacturer, ManufacturerStorage};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::{finish, StorageResultExt};
use crate::error::DbError;

/// Repository for manufacturer database operations.
#[derive(Debug, Clone)]
pub struct ManufacturerRepository {
    pool: SqlitePool,
}

impl ManufacturerRepository {
    /// Creates a new ManufacturerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ManufacturerRepository { pool }
    }
}

async fn rename(conn: &mut SqliteConnection, update: &Manufacturer) -> CoreResult<()> {
    let mut stored = sqlx::query_as::<_, Manufacturer>(
        "SELECT id, name, prev_name, prev_prev_name FROM manufacturers WHERE id = ?1",
    )
    .bind(&update.id)
    .fetch_optional(&mut *conn)
    .await
    .storage("reading manufacturer")?
    .ok_or_else(|| CoreError::not_found(&update.id))?;

    let old_name = stored.name.clone();
    stored.rename(&update.name);

    let result = sqlx::query(
        r#"
        UPDATE manufacturers
        SET name = ?2, prev_name = ?3, prev_prev_name = ?4
        WHERE id = ?1 AND name = ?5
        "#,
    )
    .bind(&stored.id)
    .bind(&stored.name)
    .bind(&stored.prev_name)
    .bind(&stored.prev_prev_name)
    .bind(&old_name)
    .execute(&mut *conn)
    .await
    .storage_unique("updating manufacturer", |_| stored.name.clone())?;

    if result.rows_affected() == 0 {
        return Err(DbError::TransactionFailed(format!(
            "manufacturer {} was modified concurrently",
            stored.id
        ))
        .into_core("updating manufacturer"));
    }
    Ok(())
}

async fn delete_unreferenced(conn: &mut SqliteConnection, id: &str) -> CoreResult<()> {
    let active_gifts: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM gifts WHERE manufacturer_id = ?1 AND is_deleted = 0",
    )
    .bind(id)
    .fetch_one(&mut *conn)
    .await
    .storage("counting manufacturer gifts")?;

    if active_gifts > 0 {
        return Err(DbError::ForeignKeyViolation {
            message: format!("manufacturer {id} is referenced by {active_gifts} active gifts"),
        }
        .into_core("deleting manufacturer"));
    }

    let result = sqlx::query("DELETE FROM manufacturers WHERE id = ?1")
        .bind(id)
        .execute(&mut *conn)
        .await
        .storage("deleting manufacturer")?;

    if result.rows_affected() == 0 {
        return Err(CoreError::not_found(id));
    }
    Ok(())
}

#[async_trait]
impl ManufacturerStorage for ManufacturerRepository {
    async fn list(&self) -> CoreResult<Vec<Manufacturer>> {
        debug!("Listing manufacturers");

        sqlx::query_as::<_, Manufacturer>(
            "SELECT id, name, prev_name, prev_prev_name FROM manufacturers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .storage("listing manufacturers")
    }

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Manufacturer>> {
        sqlx::query_as::<_, Manufacturer>(
            "SELECT id, name, prev_name, prev_prev_name FROM manufacturers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .storage("reading manufacturer")
    }

    async fn get_by_name(&self, name: &str) -> CoreResult<Option<Manufacturer>> {
        sqlx::query_as::<_, Manufacturer>(
            "SELECT id, name, prev_name, prev_prev_name FROM manufacturers WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .storage("reading manufacturer")
    }

    async fn get_by_old_name(&self, name: &str) -> CoreResult<Option<Manufacturer>> {
        sqlx::query_as::<_, Manufacturer>(
            r#"
            SELECT id, name, prev_name, prev_prev_name
            FROM manufacturers
            WHERE prev_name = ?1 OR prev_prev_name = ?1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .storage("reading manufacturer")
    }

    async fn add(&self, manufacturer: &Manufacturer) -> CoreResult<()> {
        debug!(id = %manufacturer.id, name = %manufacturer.name, "Inserting manufacturer");

        sqlx::query(
            r#"
            INSERT INTO manufacturers (id, name, prev_name, prev_prev_name)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&manufacturer.id)
        .bind(&manufacturer.name)
        .bind(&manufacturer.prev_name)
        .bind(&manufacturer.prev_prev_name)
        .execute(&self.pool)
        .await
        .storage_unique("adding manufacturer", |field| match field {
            "name" => manufacturer.name.clone(),
            _ => manufacturer.id.clone(),
        })?;

        Ok(())
    }

    async fn update(&self, manufacturer: &Manufacturer) -> CoreResult<()> {
        debug!(id = %manufacturer.id, name = %manufacturer.name, "Updating manufacturer");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = rename(&mut *tx, manufacturer).await;
        finish(tx, result, "updating manufacturer").await
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        debug!(id = %id, "Deleting manufacturer");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = delete_unreferenced(&mut *tx, id).await;
        finish(tx, result, "deleting manufacturer").await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use giftshop_core::GiftStorage;
    use std::error::Error as _;

    #[tokio::test]
    async fn test_rename_shifts_and_old_name_lookup() {
        let db = fixtures::database().await;
        let m = fixtures::manufacturer(&db, "Acme").await;
        let repo = db.manufacturers();

        let mut renamed = m.clone();
        renamed.name = "Acme Toys".to_string();
        repo.update(&renamed).await.unwrap();
        renamed.name = "Acme Group".to_string();
        repo.update(&renamed).await.unwrap();

        let stored = repo.get_by_id(&m.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Acme Group");
        assert_eq!(stored.prev_name.as_deref(), Some("Acme Toys"));
        assert_eq!(stored.prev_prev_name.as_deref(), Some("Acme"));

        assert_eq!(repo.get_by_name("Acme").await.unwrap(), None);
        assert_eq!(repo.get_by_old_name("Acme").await.unwrap().map(|m| m.id), Some(m.id.clone()));
    }

    #[tokio::test]
    async fn test_update_with_same_name_keeps_history() {
        let db = fixtures::database().await;
        let m = fixtures::manufacturer(&db, "Acme").await;
        let repo = db.manufacturers();

        let mut renamed = m.clone();
        renamed.name = "Acme Toys".to_string();
        repo.update(&renamed).await.unwrap();
        repo.update(&renamed).await.unwrap();

        let stored = repo.get_by_id(&m.id).await.unwrap().unwrap();
        assert_eq!(stored.prev_name.as_deref(), Some("Acme"));
        assert_eq!(stored.prev_prev_name, None);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = fixtures::database().await;
        fixtures::manufacturer(&db, "Acme").await;
        let other = fixtures::manufacturer(&db, "Globex").await;

        let err = db.manufacturers().add(&Manufacturer::new("Acme")).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementExists { ref field, .. } if field == "name"));

        let mut clash = other.clone();
        clash.name = "Acme".to_string();
        let err = db.manufacturers().update(&clash).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementExists { ref field, .. } if field == "name"));

        let stored = db.manufacturers().get_by_id(&other.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Globex");
        assert_eq!(stored.prev_name, None);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_active_gift() {
        let db = fixtures::database().await;
        let m = fixtures::manufacturer(&db, "Acme").await;
        fixtures::gift(&db, "Mug", &m.id, 1000).await;

        let err = db.manufacturers().delete(&m.id).await.unwrap_err();
        assert!(err.is_storage());
        assert!(err.source().is_some());
        assert!(db.manufacturers().get_by_id(&m.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_and_missing() {
        let db = fixtures::database().await;
        let m = fixtures::manufacturer(&db, "Acme").await;

        db.manufacturers().delete(&m.id).await.unwrap();
        assert_eq!(db.manufacturers().get_by_id(&m.id).await.unwrap(), None);

        let err = db.manufacturers().delete(&m.id).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_blocked_by_deleted_gift_reference() {
        let db = fixtures::database().await;
        let m = fixtures::manufacturer(&db, "Acme").await;
        let g = fixtures::gift(&db, "Mug", &m.id, 1000).await;
        db.gifts().delete(&g.id).await.unwrap();

        let err = db.manufacturers().delete(&m.id).await.unwrap_err();
        assert!(err.is_storage());
    }
}
