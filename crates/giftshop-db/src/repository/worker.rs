//! # Worker Repository
//!
//! Workers are soft-deleted. Date filters in [`WorkerFilter`] are inclusive
//! at both ends.

use async_trait::async_trait;
use giftshop_core::{CoreError, CoreResult, Worker, WorkerFilter, WorkerStorage};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{finish, soft_delete, StorageResultExt};

/// Repository for worker database operations.
#[derive(Debug, Clone)]
pub struct WorkerRepository {
    pool: SqlitePool,
}

impl WorkerRepository {
    /// Creates a new WorkerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WorkerRepository { pool }
    }
}

#[async_trait]
impl WorkerStorage for WorkerRepository {
    async fn list(&self, filter: &WorkerFilter) -> CoreResult<Vec<Worker>> {
        debug!(?filter, "Listing workers");

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, fio, post_id, birth_date, employment_date, is_deleted FROM workers WHERE 1 = 1",
        );
        if filter.only_active {
            query.push(" AND is_deleted = 0");
        }
        if let Some(post_id) = &filter.post_id {
            query.push(" AND post_id = ").push_bind(post_id.clone());
        }
        if let Some(range) = filter.birth_date {
            query
                .push(" AND birth_date >= ")
                .push_bind(range.from())
                .push(" AND birth_date <= ")
                .push_bind(range.to());
        }
        if let Some(range) = filter.employment_date {
            query
                .push(" AND employment_date >= ")
                .push_bind(range.from())
                .push(" AND employment_date <= ")
                .push_bind(range.to());
        }
        query.push(" ORDER BY fio");

        query
            .build_query_as::<Worker>()
            .fetch_all(&self.pool)
            .await
            .storage("listing workers")
    }

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Worker>> {
        sqlx::query_as::<_, Worker>(
            r#"
            SELECT id, fio, post_id, birth_date, employment_date, is_deleted
            FROM workers
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .storage("reading worker")
    }

    async fn get_by_fio(&self, fio: &str) -> CoreResult<Option<Worker>> {
        sqlx::query_as::<_, Worker>(
            r#"
            SELECT id, fio, post_id, birth_date, employment_date, is_deleted
            FROM workers
            WHERE fio = ?1 AND is_deleted = 0
            LIMIT 1
            "#,
        )
        .bind(fio)
        .fetch_optional(&self.pool)
        .await
        .storage("reading worker")
    }

    async fn add(&self, worker: &Worker) -> CoreResult<()> {
        debug!(id = %worker.id, fio = %worker.fio, post_id = %worker.post_id, "Inserting worker");

        sqlx::query(
            r#"
            INSERT INTO workers (id, fio, post_id, birth_date, employment_date, is_deleted)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)
            "#,
        )
        .bind(&worker.id)
        .bind(&worker.fio)
        .bind(&worker.post_id)
        .bind(worker.birth_date)
        .bind(worker.employment_date)
        .execute(&self.pool)
        .await
        .storage_unique("adding worker", |_| worker.id.clone())?;

        Ok(())
    }

    async fn update(&self, worker: &Worker) -> CoreResult<()> {
        debug!(id = %worker.id, "Updating worker");

        let result = sqlx::query(
            r#"
            UPDATE workers
            SET fio = ?2, post_id = ?3, birth_date = ?4, employment_date = ?5
            WHERE id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(&worker.id)
        .bind(&worker.fio)
        .bind(&worker.post_id)
        .bind(worker.birth_date)
        .bind(worker.employment_date)
        .execute(&self.pool)
        .await
        .storage("updating worker")?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(&worker.id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        debug!(id = %id, "Deleting worker");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = soft_delete(&mut *tx, "workers", id).await;
        finish(tx, result, "deleting worker").await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{self, at};
    use giftshop_core::DateRange;

    #[tokio::test]
    async fn test_soft_delete_lifecycle() {
        let db = fixtures::database().await;
        let post = fixtures::post(&db, "Clerk").await;
        let mut worker = fixtures::worker(&db, "Petrov", &post.id).await;
        let repo = db.workers();

        repo.delete(&worker.id).await.unwrap();
        assert_eq!(repo.get_by_id(&worker.id).await.unwrap(), None);
        assert_eq!(repo.get_by_fio("Petrov").await.unwrap(), None);

        let err = repo.delete(&worker.id).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementDeleted { .. }));

        worker.fio = "Sidorov".to_string();
        let err = repo.update(&worker).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementNotFound { .. }));

        let err = repo.delete(&giftshop_core::new_id()).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_changes_fields() {
        let db = fixtures::database().await;
        let clerk = fixtures::post(&db, "Clerk").await;
        let manager = fixtures::post(&db, "Manager").await;
        let mut worker = fixtures::worker(&db, "Petrov", &clerk.id).await;

        worker.post_id = manager.id.clone();
        db.workers().update(&worker).await.unwrap();

        let stored = db.workers().get_by_id(&worker.id).await.unwrap().unwrap();
        assert_eq!(stored, worker);
    }

    #[tokio::test]
    async fn test_duplicate_id() {
        let db = fixtures::database().await;
        let post = fixtures::post(&db, "Clerk").await;
        let worker = fixtures::worker(&db, "Petrov", &post.id).await;

        let err = db.workers().add(&worker).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementExists { ref field, .. } if field == "id"));
    }

    #[tokio::test]
    async fn test_list_filters_inclusive() {
        let db = fixtures::database().await;
        let clerk = fixtures::post(&db, "Clerk").await;
        let manager = fixtures::post(&db, "Manager").await;

        let early = Worker::new("Antonov", &clerk.id, at(1990, 1, 1), at(2010, 1, 1));
        let late = Worker::new("Borisov", &manager.id, at(1995, 6, 1), at(2020, 6, 1));
        let gone = Worker::new("Vasiliev", &clerk.id, at(1992, 1, 1), at(2012, 1, 1));
        for w in [&early, &late, &gone] {
            db.workers().add(w).await.unwrap();
        }
        db.workers().delete(&gone.id).await.unwrap();

        let repo = db.workers();
        assert_eq!(repo.list(&WorkerFilter::new()).await.unwrap().len(), 2);
        assert_eq!(repo.list(&WorkerFilter::new().include_deleted()).await.unwrap().len(), 3);

        let by_post = repo.list(&WorkerFilter::new().post(&clerk.id)).await.unwrap();
        assert_eq!(by_post, vec![early.clone()]);

        let born = DateRange::new(at(1990, 1, 1), at(1995, 6, 1)).unwrap();
        assert_eq!(repo.list(&WorkerFilter::new().born_between(born)).await.unwrap().len(), 2);

        let hired = DateRange::new(at(2010, 1, 1), at(2010, 1, 1)).unwrap();
        let hired = repo.list(&WorkerFilter::new().employed_between(hired)).await.unwrap();
        assert_eq!(hired, vec![early]);
    }
}
