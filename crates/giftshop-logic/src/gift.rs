//! # Gift Logic
//!
//! Gift reads default to active gifts; pass `only_active = false` to include
//! soft-deleted ones. Price changes are recorded by the store.

use std::sync::Arc;

use giftshop_core::validation::is_uuid;
use giftshop_core::{CoreResult, Gift, GiftFilter, GiftHistory, GiftStorage, Validate};
use tracing::info;

use crate::{found, require_argument, require_id};

#[derive(Clone)]
pub struct GiftLogic {
    storage: Arc<dyn GiftStorage>,
}

impl GiftLogic {
    pub fn new(storage: Arc<dyn GiftStorage>) -> Self {
        GiftLogic { storage }
    }

    pub async fn get_all_gifts(&self, only_active: bool) -> CoreResult<Vec<Gift>> {
        info!(only_active, "get_all_gifts");
        self.storage.list(&gift_filter(only_active)).await
    }

    pub async fn get_all_gifts_by_manufacturer(
        &self,
        manufacturer_id: &str,
        only_active: bool,
    ) -> CoreResult<Vec<Gift>> {
        info!(manufacturer_id, only_active, "get_all_gifts_by_manufacturer");
        require_id("manufacturer_id", manufacturer_id)?;
        self.storage
            .list(&gift_filter(only_active).manufacturer(manufacturer_id))
            .await
    }

    /// Price history of a gift, most recent change first.
    pub async fn get_gift_history(&self, gift_id: &str) -> CoreResult<Vec<GiftHistory>> {
        info!(gift_id, "get_gift_history");
        require_id("gift_id", gift_id)?;
        self.storage.get_history(gift_id).await
    }

    pub async fn get_gift_by_data(&self, data: &str) -> CoreResult<Gift> {
        info!(data, "get_gift_by_data");
        require_argument("data", data)?;

        let gift = if is_uuid(data) {
            self.storage.get_by_id(data).await?
        } else {
            self.storage.get_by_name(data).await?
        };
        found(gift, data)
    }

    pub async fn insert_gift(&self, gift: &Gift) -> CoreResult<()> {
        info!(?gift, "insert_gift");
        gift.validate()?;
        self.storage.add(gift).await
    }

    pub async fn update_gift(&self, gift: &Gift) -> CoreResult<()> {
        info!(?gift, "update_gift");
        gift.validate()?;
        self.storage.update(gift).await
    }

    pub async fn delete_gift(&self, id: &str) -> CoreResult<()> {
        info!(id, "delete_gift");
        require_id("id", id)?;
        self.storage.delete(id).await
    }
}

fn gift_filter(only_active: bool) -> GiftFilter {
    if only_active {
        GiftFilter::new()
    } else {
        GiftFilter::new().include_deleted()
    }
}
