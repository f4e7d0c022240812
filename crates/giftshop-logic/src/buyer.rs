//! # Buyer Logic

use std::sync::Arc;

use giftshop_core::validation::{is_phone_number, is_uuid};
use giftshop_core::{Buyer, BuyerStorage, CoreResult, Validate};
use tracing::info;

use crate::{found, require_argument, require_id};

/// Buyer operations. Lookups accept an id, a phone number or a full name.
#[derive(Clone)]
pub struct BuyerLogic {
    storage: Arc<dyn BuyerStorage>,
}

impl BuyerLogic {
    pub fn new(storage: Arc<dyn BuyerStorage>) -> Self {
        BuyerLogic { storage }
    }

    pub async fn get_all_buyers(&self) -> CoreResult<Vec<Buyer>> {
        info!("get_all_buyers");
        self.storage.list().await
    }

    /// Resolves `data` as an id, then as a phone number, then as a full name.
    pub async fn get_buyer_by_data(&self, data: &str) -> CoreResult<Buyer> {
        info!(data, "get_buyer_by_data");
        require_argument("data", data)?;

        let buyer = if is_uuid(data) {
            self.storage.get_by_id(data).await?
        } else if is_phone_number(data) {
            self.storage.get_by_phone_number(data).await?
        } else {
            self.storage.get_by_fio(data).await?
        };
        found(buyer, data)
    }

    pub async fn insert_buyer(&self, buyer: &Buyer) -> CoreResult<()> {
        info!(?buyer, "insert_buyer");
        buyer.validate()?;
        self.storage.add(buyer).await
    }

    pub async fn update_buyer(&self, buyer: &Buyer) -> CoreResult<()> {
        info!(?buyer, "update_buyer");
        buyer.validate()?;
        self.storage.update(buyer).await
    }

    /// Hard delete. Sales of the buyer stay, without a buyer reference.
    pub async fn delete_buyer(&self, id: &str) -> CoreResult<()> {
        info!(id, "delete_buyer");
        require_id("id", id)?;
        self.storage.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftshop_core::{CoreError, ValidationError};
    use giftshop_db::{Database, DbConfig};

    async fn logic() -> BuyerLogic {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        BuyerLogic::new(Arc::new(db.buyers()))
    }

    #[tokio::test]
    async fn test_lookup_dispatch() {
        let logic = logic().await;
        let buyer = Buyer::new("Ivanova Maria", "+7 912 345-67-89", 5.0);
        logic.insert_buyer(&buyer).await.unwrap();

        assert_eq!(logic.get_buyer_by_data(&buyer.id).await.unwrap().id, buyer.id);
        assert_eq!(
            logic.get_buyer_by_data("+7 912 345-67-89").await.unwrap().id,
            buyer.id
        );
        assert_eq!(logic.get_buyer_by_data("Ivanova Maria").await.unwrap().id, buyer.id);

        let err = logic.get_buyer_by_data("Nobody").await.unwrap_err();
        assert!(matches!(err, CoreError::ElementNotFound { ref id } if id == "Nobody"));

        let err = logic.get_buyer_by_data("").await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyArgument { .. }));
    }

    #[tokio::test]
    async fn test_invalid_buyer_is_rejected() {
        let logic = logic().await;
        let buyer = Buyer::new("Ivanova Maria", "call me", 5.0);

        let err = logic.insert_buyer(&buyer).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { ref field, .. }) if field == "phone_number"
        ));
        assert!(logic.get_all_buyers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_checks_id() {
        let logic = logic().await;

        let err = logic.delete_buyer("12345").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let buyer = Buyer::new("Fedorov Pavel", "8(495)123-45-67", 0.0);
        logic.insert_buyer(&buyer).await.unwrap();
        logic.delete_buyer(&buyer.id).await.unwrap();
        assert!(logic.get_all_buyers().await.unwrap().is_empty());
    }
}
