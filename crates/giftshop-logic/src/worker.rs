//! # Worker Logic

use std::sync::Arc;

use chrono::{DateTime, Utc};
use giftshop_core::validation::is_uuid;
use giftshop_core::{CoreResult, DateRange, Validate, Worker, WorkerFilter, WorkerStorage};
use tracing::info;

use crate::{found, require_argument, require_id};

#[derive(Clone)]
pub struct WorkerLogic {
    storage: Arc<dyn WorkerStorage>,
}

impl WorkerLogic {
    pub fn new(storage: Arc<dyn WorkerStorage>) -> Self {
        WorkerLogic { storage }
    }

    pub async fn get_all_workers(&self, only_active: bool) -> CoreResult<Vec<Worker>> {
        info!(only_active, "get_all_workers");
        self.storage.list(&worker_filter(only_active)).await
    }

    pub async fn get_all_workers_by_post(
        &self,
        post_id: &str,
        only_active: bool,
    ) -> CoreResult<Vec<Worker>> {
        info!(post_id, only_active, "get_all_workers_by_post");
        require_id("post_id", post_id)?;
        self.storage
            .list(&worker_filter(only_active).post(post_id))
            .await
    }

    /// Birth date within `[from, to]`.
    pub async fn get_all_workers_by_birth_date(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        only_active: bool,
    ) -> CoreResult<Vec<Worker>> {
        info!(%from, %to, only_active, "get_all_workers_by_birth_date");
        let range = DateRange::new(from, to)?;
        self.storage
            .list(&worker_filter(only_active).born_between(range))
            .await
    }

    /// Employment date within `[from, to]`.
    pub async fn get_all_workers_by_employment_date(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        only_active: bool,
    ) -> CoreResult<Vec<Worker>> {
        info!(%from, %to, only_active, "get_all_workers_by_employment_date");
        let range = DateRange::new(from, to)?;
        self.storage
            .list(&worker_filter(only_active).employed_between(range))
            .await
    }

    pub async fn get_worker_by_data(&self, data: &str) -> CoreResult<Worker> {
        info!(data, "get_worker_by_data");
        require_argument("data", data)?;

        let worker = if is_uuid(data) {
            self.storage.get_by_id(data).await?
        } else {
            self.storage.get_by_fio(data).await?
        };
        found(worker, data)
    }

    pub async fn insert_worker(&self, worker: &Worker) -> CoreResult<()> {
        info!(?worker, "insert_worker");
        worker.validate()?;
        self.storage.add(worker).await
    }

    pub async fn update_worker(&self, worker: &Worker) -> CoreResult<()> {
        info!(?worker, "update_worker");
        worker.validate()?;
        self.storage.update(worker).await
    }

    pub async fn delete_worker(&self, id: &str) -> CoreResult<()> {
        info!(id, "delete_worker");
        require_id("id", id)?;
        self.storage.delete(id).await
    }
}

fn worker_filter(only_active: bool) -> WorkerFilter {
    if only_active {
        WorkerFilter::new()
    } else {
        WorkerFilter::new().include_deleted()
    }
}
