//! # Manufacturer Logic

use std::sync::Arc;

use giftshop_core::validation::is_uuid;
use giftshop_core::{CoreResult, Manufacturer, ManufacturerStorage, Validate};
use tracing::info;

use crate::{found, require_argument, require_id};

#[derive(Clone)]
pub struct ManufacturerLogic {
    storage: Arc<dyn ManufacturerStorage>,
}

impl ManufacturerLogic {
    pub fn new(storage: Arc<dyn ManufacturerStorage>) -> Self {
        ManufacturerLogic { storage }
    }

    pub async fn get_all_manufacturers(&self) -> CoreResult<Vec<Manufacturer>> {
        info!("get_all_manufacturers");
        self.storage.list().await
    }

    /// Resolves `data` as an id, otherwise as the current name and then as
    /// either of the two previous names.
    pub async fn get_manufacturer_by_data(&self, data: &str) -> CoreResult<Manufacturer> {
        info!(data, "get_manufacturer_by_data");
        require_argument("data", data)?;

        if is_uuid(data) {
            return found(self.storage.get_by_id(data).await?, data);
        }
        if let Some(manufacturer) = self.storage.get_by_name(data).await? {
            return Ok(manufacturer);
        }
        found(self.storage.get_by_old_name(data).await?, data)
    }

    pub async fn insert_manufacturer(&self, manufacturer: &Manufacturer) -> CoreResult<()> {
        info!(?manufacturer, "insert_manufacturer");
        manufacturer.validate()?;
        self.storage.add(manufacturer).await
    }

    pub async fn update_manufacturer(&self, manufacturer: &Manufacturer) -> CoreResult<()> {
        info!(?manufacturer, "update_manufacturer");
        manufacturer.validate()?;
        self.storage.update(manufacturer).await
    }

    pub async fn delete_manufacturer(&self, id: &str) -> CoreResult<()> {
        info!(id, "delete_manufacturer");
        require_id("id", id)?;
        self.storage.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftshop_core::{new_id, CoreError, Gift, GiftStorage, GiftType, Money, ValidationError};
    use giftshop_db::{Database, DbConfig};

    async fn logic() -> ManufacturerLogic {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        ManufacturerLogic::new(Arc::new(db.manufacturers()))
    }

    async fn with_database() -> (Database, ManufacturerLogic) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let logic = ManufacturerLogic::new(Arc::new(db.manufacturers()));
        (db, logic)
    }

    #[tokio::test]
    async fn test_lookup_by_old_names() {
        let logic = logic().await;
        let mut acme = Manufacturer::new("Acme");
        logic.insert_manufacturer(&acme).await.unwrap();

        acme.name = "Acme Corp".to_string();
        logic.update_manufacturer(&acme).await.unwrap();
        acme.name = "Acme Group".to_string();
        logic.update_manufacturer(&acme).await.unwrap();

        for key in ["Acme Group", "Acme Corp", "Acme"] {
            let found = logic.get_manufacturer_by_data(key).await.unwrap();
            assert_eq!(found.id, acme.id, "lookup by {key}");
        }

        let stored = logic.get_manufacturer_by_data(&acme.id).await.unwrap();
        assert_eq!(stored.prev_name.as_deref(), Some("Acme Corp"));
        assert_eq!(stored.prev_prev_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_unknown_name() {
        let logic = logic().await;
        let err = logic.get_manufacturer_by_data("Globex").await.unwrap_err();
        assert!(matches!(err, CoreError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_name_required() {
        let logic = logic().await;
        let err = logic
            .insert_manufacturer(&Manufacturer::new(""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Required { ref field }) if field == "name"
        ));
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let logic = logic().await;
        let err = logic.get_manufacturer_by_data(&new_id()).await.unwrap_err();
        assert!(matches!(err, CoreError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_checks_id_format() {
        let logic = logic().await;
        let err = logic.delete_manufacturer("acme").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidFormat { ref field, .. }) if field == "id"
        ));
    }

    #[tokio::test]
    async fn test_delete_refused_while_gifts_reference_it() {
        let (db, logic) = with_database().await;
        let acme = Manufacturer::new("Acme");
        logic.insert_manufacturer(&acme).await.unwrap();
        let mug = Gift::new("Mug", GiftType::Accessories, &acme.id, Money::from_cents(1000));
        db.gifts().add(&mug).await.unwrap();

        let err = logic.delete_manufacturer(&acme.id).await.unwrap_err();
        assert!(err.is_storage());

        // A soft-deleted gift still holds the reference.
        db.gifts().delete(&mug.id).await.unwrap();
        let err = logic.delete_manufacturer(&acme.id).await.unwrap_err();
        assert!(err.is_storage());
        assert_eq!(logic.get_manufacturer_by_data("Acme").await.unwrap().id, acme.id);

        let globex = Manufacturer::new("Globex");
        logic.insert_manufacturer(&globex).await.unwrap();
        logic.delete_manufacturer(&globex.id).await.unwrap();
        assert!(matches!(
            logic.get_manufacturer_by_data(&globex.id).await.unwrap_err(),
            CoreError::ElementNotFound { .. }
        ));
    }
}
