//! # Salary Repository
//!
//! Append-only payroll. Period queries include both ends.

use async_trait::async_trait;
use giftshop_core::{CoreResult, DateRange, Salary, SalaryStorage};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::{finish, StorageResultExt};

/// Repository for salary database operations.
#[derive(Debug, Clone)]
pub struct SalaryRepository {
    pool: SqlitePool,
}

impl SalaryRepository {
    /// Creates a new SalaryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalaryRepository { pool }
    }
}

#[async_trait]
impl SalaryStorage for SalaryRepository {
    async fn list(&self, period: &DateRange, worker_id: Option<&str>) -> CoreResult<Vec<Salary>> {
        debug!(from = %period.from(), to = %period.to(), worker_id, "Listing salaries");

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT worker_id, salary_date, salary FROM salaries WHERE salary_date >= ",
        );
        query
            .push_bind(period.from())
            .push(" AND salary_date <= ")
            .push_bind(period.to());
        if let Some(worker_id) = worker_id {
            query.push(" AND worker_id = ").push_bind(worker_id.to_string());
        }
        query.push(" ORDER BY salary_date, id");

        query
            .build_query_as::<Salary>()
            .fetch_all(&self.pool)
            .await
            .storage("listing salaries")
    }

    async fn add(&self, salary: &Salary) -> CoreResult<()> {
        debug!(worker_id = %salary.worker_id, salary = %salary.salary, "Inserting salary");

        let mut conn = self.pool.acquire().await.storage("acquiring connection")?;
        insert_salaries(&mut *conn, std::slice::from_ref(salary)).await
    }

    async fn add_all(&self, salaries: &[Salary]) -> CoreResult<()> {
        debug!(count = salaries.len(), "Inserting salaries");

        let mut tx = self.pool.begin().await.storage("beginning transaction")?;
        let result = insert_salaries(&mut *tx, salaries).await;
        finish(tx, result, "adding salaries").await
    }
}

async fn insert_salaries(conn: &mut SqliteConnection, salaries: &[Salary]) -> CoreResult<()> {
    for salary in salaries {
        sqlx::query("INSERT INTO salaries (worker_id, salary_date, salary) VALUES (?1, ?2, ?3)")
            .bind(&salary.worker_id)
            .bind(salary.salary_date)
            .bind(salary.salary)
            .execute(&mut *conn)
            .await
            .storage("adding salary")?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{self, at};
    use giftshop_core::Money;

    #[tokio::test]
    async fn test_period_includes_both_ends() {
        let db = fixtures::database().await;
        let post = fixtures::post(&db, "Clerk").await;
        let petrov = fixtures::worker(&db, "Petrov", &post.id).await;
        let sidorov = fixtures::worker(&db, "Sidorov", &post.id).await;
        let repo = db.salaries();

        for (worker, date) in [
            (&petrov, at(2024, 1, 31)),
            (&petrov, at(2024, 2, 29)),
            (&sidorov, at(2024, 2, 29)),
            (&petrov, at(2024, 3, 31)),
        ] {
            repo.add(&Salary::new(&worker.id, date, Money::from_cents(50_000)))
                .await
                .unwrap();
        }

        let period = DateRange::new(at(2024, 1, 31), at(2024, 2, 29)).unwrap();
        assert_eq!(repo.list(&period, None).await.unwrap().len(), 3);

        let mine = repo.list(&period, Some(&petrov.id)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].salary_date, at(2024, 1, 31));
        assert!(mine.iter().all(|s| s.worker_id == petrov.id));
    }

    #[tokio::test]
    async fn test_empty_period() {
        let db = fixtures::database().await;
        let period = DateRange::new(at(2024, 1, 1), at(2024, 12, 31)).unwrap();
        assert!(db.salaries().list(&period, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_all_is_atomic() {
        let db = fixtures::database().await;
        let post = fixtures::post(&db, "Clerk").await;
        let petrov = fixtures::worker(&db, "Petrov", &post.id).await;
        let repo = db.salaries();
        let may = at(2024, 5, 31);

        let batch = [
            Salary::new(&petrov.id, may, Money::from_cents(50_000)),
            Salary::new(giftshop_core::new_id(), may, Money::from_cents(50_000)),
        ];
        let err = repo.add_all(&batch).await.unwrap_err();
        assert!(err.is_storage());

        let period = DateRange::new(may, may).unwrap();
        assert!(repo.list(&period, None).await.unwrap().is_empty());

        repo.add_all(&batch[..1]).await.unwrap();
        assert_eq!(repo.list(&period, None).await.unwrap().len(), 1);
    }
}
