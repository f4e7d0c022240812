//! # giftshop-logic: Business-Logic Façade
//!
//! Services that sit between callers and the storage contracts. Each service
//! owns an `Arc<dyn ...Storage>` and adds, in order:
//!
//! 1. an `info!` record of the call and its arguments
//! 2. rejection of empty or malformed arguments (`EmptyArgument`, `Validation`)
//! 3. date-order checks (`IncorrectDates`) for period queries
//! 4. `validate()` before every write
//! 5. translation of an absent single result into `ElementNotFound`
//!
//! Anything the store returns is passed through unchanged.
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use giftshop_db::{Database, DbConfig};
//! use giftshop_logic::GiftLogic;
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//! let gifts = GiftLogic::new(Arc::new(db.gifts()));
//! let mug = gifts.get_gift_by_data("Mug").await?;
//! ```

use giftshop_core::validation::validate_uuid;
use giftshop_core::{CoreError, CoreResult};

pub mod buyer;
pub mod gift;
pub mod manufacturer;
pub mod post;
pub mod salary;
pub mod sale;
pub mod worker;

pub use buyer::BuyerLogic;
pub use gift::GiftLogic;
pub use manufacturer::ManufacturerLogic;
pub use post::PostLogic;
pub use salary::SalaryLogic;
pub use sale::SaleLogic;
pub use worker::WorkerLogic;

// =============================================================================
// Argument Checks
// =============================================================================

/// Rejects an empty or whitespace-only argument.
pub(crate) fn require_argument(name: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::empty_argument(name));
    }
    Ok(())
}

/// Rejects an empty argument, then one that is not a UUID.
pub(crate) fn require_id(name: &str, value: &str) -> CoreResult<()> {
    require_argument(name, value)?;
    validate_uuid(name, value)?;
    Ok(())
}

/// Turns an absent lookup result into `ElementNotFound` keyed by `key`.
pub(crate) fn found<T>(value: Option<T>, key: &str) -> CoreResult<T> {
    value.ok_or_else(|| CoreError::not_found(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use giftshop_core::{new_id, ValidationError};

    #[test]
    fn test_require_argument() {
        assert!(require_argument("data", "Mug").is_ok());
        assert!(matches!(
            require_argument("data", "  "),
            Err(CoreError::EmptyArgument { ref name }) if name == "data"
        ));
    }

    #[test]
    fn test_require_id() {
        assert!(require_id("id", &new_id()).is_ok());
        assert!(matches!(require_id("id", ""), Err(CoreError::EmptyArgument { .. })));
        assert!(matches!(
            require_id("id", "not-an-id"),
            Err(CoreError::Validation(ValidationError::InvalidFormat { ref field, .. })) if field == "id"
        ));
    }

    #[test]
    fn test_found() {
        assert_eq!(found(Some(3), "k").unwrap(), 3);
        assert!(matches!(
            found::<i32>(None, "k"),
            Err(CoreError::ElementNotFound { ref id }) if id == "k"
        ));
    }
}
