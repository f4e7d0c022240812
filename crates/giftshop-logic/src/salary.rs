//! # Salary Logic
//!
//! Payroll queries include both ends of the period. Monthly calculation
//! appends one salary per active worker whose post has an actual version,
//! and writes the whole month at once or not at all.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use giftshop_core::{
    CoreResult, DateRange, PostStorage, Salary, SalaryStorage, Validate, ValidationError,
    WorkerFilter, WorkerStorage,
};
use tracing::{info, warn};

use crate::require_id;

#[derive(Clone)]
pub struct SalaryLogic {
    salaries: Arc<dyn SalaryStorage>,
    workers: Arc<dyn WorkerStorage>,
    posts: Arc<dyn PostStorage>,
}

impl SalaryLogic {
    pub fn new(
        salaries: Arc<dyn SalaryStorage>,
        workers: Arc<dyn WorkerStorage>,
        posts: Arc<dyn PostStorage>,
    ) -> Self {
        SalaryLogic {
            salaries,
            workers,
            posts,
        }
    }

    pub async fn get_all_salaries_by_period(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<Salary>> {
        info!(%from, %to, "get_all_salaries_by_period");
        let period = DateRange::new(from, to)?;
        self.salaries.list(&period, None).await
    }

    pub async fn get_all_salaries_by_period_by_worker(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        worker_id: &str,
    ) -> CoreResult<Vec<Salary>> {
        info!(%from, %to, worker_id, "get_all_salaries_by_period_by_worker");
        let period = DateRange::new(from, to)?;
        require_id("worker_id", worker_id)?;
        self.salaries.list(&period, Some(worker_id)).await
    }

    /// Pays every active worker the salary of their post for the month that
    /// contains `date`. Entries are dated the last second of that month.
    ///
    /// Workers whose post has no actual version are skipped. Nothing is
    /// stored if any lookup or validation fails.
    pub async fn calculate_salary_by_month(&self, date: DateTime<Utc>) -> CoreResult<()> {
        info!(%date, "calculate_salary_by_month");
        let salary_date = month_end(date)?;

        let workers = self.workers.list(&WorkerFilter::new()).await?;
        let mut payroll = Vec::with_capacity(workers.len());
        for worker in &workers {
            let Some(post) = self.posts.get_by_id(&worker.post_id).await? else {
                warn!(worker_id = %worker.id, post_id = %worker.post_id, "No actual post, skipping");
                continue;
            };

            let salary = Salary::new(&worker.id, salary_date, post.salary);
            salary.validate()?;
            payroll.push(salary);
        }

        self.salaries.add_all(&payroll).await?;
        info!(%salary_date, paid = payroll.len(), workers = workers.len(), "Salaries calculated");
        Ok(())
    }
}

/// Last second of the month containing `date`.
fn month_end(date: DateTime<Utc>) -> CoreResult<DateTime<Utc>> {
    let (year, month) = match date.month() {
        12 => (date.year() + 1, 1),
        m => (date.year(), m + 1),
    };
    let next_month = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ValidationError::invalid_format("date", "month is out of range"))?;
    Ok(next_month - Duration::seconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use giftshop_core::{new_id, CoreError, Money, Post, PostType, Worker};
    use giftshop_db::{Database, DbConfig, PostRepository};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Post store whose `get_by_id` fails from the `fail_at`-th call on.
    struct FailingPosts {
        inner: PostRepository,
        reads: AtomicUsize,
        fail_at: usize,
    }

    #[async_trait]
    impl PostStorage for FailingPosts {
        async fn list(&self, only_actual: bool) -> CoreResult<Vec<Post>> {
            self.inner.list(only_actual).await
        }

        async fn get_history(&self, post_id: &str) -> CoreResult<Vec<Post>> {
            self.inner.get_history(post_id).await
        }

        async fn get_by_id(&self, post_id: &str) -> CoreResult<Option<Post>> {
            if self.reads.fetch_add(1, Ordering::SeqCst) + 1 >= self.fail_at {
                return Err(CoreError::storage("reading post", "connection reset"));
            }
            self.inner.get_by_id(post_id).await
        }

        async fn get_by_name(&self, name: &str) -> CoreResult<Option<Post>> {
            self.inner.get_by_name(name).await
        }

        async fn add(&self, post: &Post) -> CoreResult<()> {
            self.inner.add(post).await
        }

        async fn update(&self, post: &Post) -> CoreResult<()> {
            self.inner.update(post).await
        }

        async fn delete(&self, post_id: &str) -> CoreResult<()> {
            self.inner.delete(post_id).await
        }

        async fn restore(&self, post_id: &str) -> CoreResult<()> {
            self.inner.restore(post_id).await
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_month_end() {
        assert_eq!(
            month_end(at(2024, 2, 10)).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()
        );
        assert_eq!(
            month_end(at(2023, 12, 31)).unwrap(),
            Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()
        );
    }

    struct Payroll {
        db: Database,
        logic: SalaryLogic,
    }

    async fn payroll() -> Payroll {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let logic = SalaryLogic::new(
            Arc::new(db.salaries()),
            Arc::new(db.workers()),
            Arc::new(db.posts()),
        );
        Payroll { db, logic }
    }

    #[tokio::test]
    async fn test_calculate_month() {
        let Payroll { db, logic } = payroll().await;

        let clerk = Post::new("Clerk", PostType::Assistant, Money::from_cents(40_000));
        let manager = Post::new("Manager", PostType::Manager, Money::from_cents(90_000));
        let closed = Post::new("Courier", PostType::Assistant, Money::from_cents(30_000));
        for post in [&clerk, &manager, &closed] {
            db.posts().add(post).await.unwrap();
        }
        db.posts().delete(&closed.id).await.unwrap();

        let petrov = Worker::new("Petrov", &clerk.id, at(1990, 1, 1), at(2010, 1, 1));
        let smirnova = Worker::new("Smirnova", &manager.id, at(1980, 1, 1), at(2005, 1, 1));
        let courier = Worker::new("Courier", &closed.id, at(1992, 1, 1), at(2012, 1, 1));
        let gone = Worker::new("Gone", &clerk.id, at(1985, 1, 1), at(2008, 1, 1));
        for worker in [&petrov, &smirnova, &courier, &gone] {
            db.workers().add(worker).await.unwrap();
        }
        db.workers().delete(&gone.id).await.unwrap();

        logic.calculate_salary_by_month(at(2024, 5, 15)).await.unwrap();

        let may = logic
            .get_all_salaries_by_period(at(2024, 5, 1), month_end(at(2024, 5, 1)).unwrap())
            .await
            .unwrap();
        assert_eq!(may.len(), 2);
        assert!(may.iter().all(|s| s.salary_date == month_end(at(2024, 5, 1)).unwrap()));

        let mine = logic
            .get_all_salaries_by_period_by_worker(at(2024, 5, 1), at(2024, 6, 1), &smirnova.id)
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].salary, Money::from_cents(90_000));

        let june = logic
            .get_all_salaries_by_period(at(2024, 6, 1), at(2024, 6, 30))
            .await
            .unwrap();
        assert!(june.is_empty());
    }

    #[tokio::test]
    async fn test_argument_checks() {
        let Payroll { logic, .. } = payroll().await;

        let err = logic
            .get_all_salaries_by_period(at(2024, 6, 1), at(2024, 5, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::IncorrectDates { .. }));

        let err = logic
            .get_all_salaries_by_period_by_worker(at(2024, 5, 1), at(2024, 6, 1), "")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyArgument { .. }));

        let unknown = new_id();
        assert!(logic
            .get_all_salaries_by_period_by_worker(at(2024, 5, 1), at(2024, 6, 1), &unknown)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_failed_month_stores_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let clerk = Post::new("Clerk", PostType::Assistant, Money::from_cents(40_000));
        db.posts().add(&clerk).await.unwrap();
        for fio in ["Petrov", "Sidorov", "Smirnova"] {
            let worker = Worker::new(fio, &clerk.id, at(1990, 1, 1), at(2010, 1, 1));
            db.workers().add(&worker).await.unwrap();
        }

        let posts = FailingPosts {
            inner: db.posts(),
            reads: AtomicUsize::new(0),
            fail_at: 2,
        };
        let logic = SalaryLogic::new(Arc::new(db.salaries()), Arc::new(db.workers()), Arc::new(posts));

        let err = logic.calculate_salary_by_month(at(2024, 5, 15)).await.unwrap_err();
        assert!(err.is_storage());

        let may = logic
            .get_all_salaries_by_period(at(2024, 5, 1), at(2024, 6, 1))
            .await
            .unwrap();
        assert!(may.is_empty());

        let retry = SalaryLogic::new(
            Arc::new(db.salaries()),
            Arc::new(db.workers()),
            Arc::new(db.posts()),
        );
        retry.calculate_salary_by_month(at(2024, 5, 15)).await.unwrap();
        let may = retry
            .get_all_salaries_by_period(at(2024, 5, 1), at(2024, 6, 1))
            .await
            .unwrap();
        assert_eq!(may.len(), 3);
    }
}
