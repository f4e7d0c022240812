//! # Sale Logic
//!
//! Period queries use `[from, to)`: a sale dated exactly `from` is included,
//! one dated exactly `to` is not. `from > to` is rejected before the store
//! is called.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use giftshop_core::{CoreResult, DateRange, Sale, SaleFilter, SaleStorage, Validate};
use tracing::info;

use crate::{found, require_id};

#[derive(Clone)]
pub struct SaleLogic {
    storage: Arc<dyn SaleStorage>,
}

impl SaleLogic {
    pub fn new(storage: Arc<dyn SaleStorage>) -> Self {
        SaleLogic { storage }
    }

    pub async fn get_all_sales_by_period(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<Sale>> {
        info!(%from, %to, "get_all_sales_by_period");
        let period = DateRange::new(from, to)?;
        self.storage.list(&SaleFilter::new().period(period)).await
    }

    pub async fn get_all_sales_by_worker_by_period(
        &self,
        worker_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<Sale>> {
        info!(worker_id, %from, %to, "get_all_sales_by_worker_by_period");
        let period = DateRange::new(from, to)?;
        require_id("worker_id", worker_id)?;
        self.storage
            .list(&SaleFilter::new().period(period).worker(worker_id))
            .await
    }

    pub async fn get_all_sales_by_buyer_by_period(
        &self,
        buyer_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<Sale>> {
        info!(buyer_id, %from, %to, "get_all_sales_by_buyer_by_period");
        let period = DateRange::new(from, to)?;
        require_id("buyer_id", buyer_id)?;
        self.storage
            .list(&SaleFilter::new().period(period).buyer(buyer_id))
            .await
    }

    /// Sales in the period that contain at least one line item of the gift.
    pub async fn get_all_sales_by_gift_by_period(
        &self,
        gift_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> CoreResult<Vec<Sale>> {
        info!(gift_id, %from, %to, "get_all_sales_by_gift_by_period");
        let period = DateRange::new(from, to)?;
        require_id("gift_id", gift_id)?;
        self.storage
            .list(&SaleFilter::new().period(period).gift(gift_id))
            .await
    }

    /// Sales are only looked up by id. Cancelled sales are returned too.
    pub async fn get_sale_by_data(&self, data: &str) -> CoreResult<Sale> {
        info!(data, "get_sale_by_data");
        require_id("data", data)?;
        found(self.storage.get_by_id(data).await?, data)
    }

    pub async fn insert_sale(&self, sale: &Sale) -> CoreResult<()> {
        info!(?sale, "insert_sale");
        sale.validate()?;
        self.storage.add(sale).await
    }

    pub async fn cancel_sale(&self, id: &str) -> CoreResult<()> {
        info!(id, "cancel_sale");
        require_id("id", id)?;
        self.storage.cancel(id).await
    }
}
