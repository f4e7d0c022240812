//! # Storage Contracts
//!
//! Async traits implemented by the persistence layer and consumed by the
//! business-logic façade.
//!
//! ## Shared Rules
//! - `list*` never fails for an empty result; it returns an empty `Vec`.
//! - `get_by_*` returns `Ok(None)` when nothing active matches.
//! - `add` rejects id or natural-key collisions with
//!   [`CoreError::ElementExists`](crate::CoreError::ElementExists) and never
//!   stores a record as already deleted.
//! - `update` on a missing or soft-deleted row fails with `ElementNotFound`.
//! - `delete` of a row that is already in its terminal state fails with
//!   `ElementDeleted`; an unknown id fails with `ElementNotFound`.
//! - Multi-row writes are atomic.

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::filter::{DateRange, GiftFilter, SaleFilter, WorkerFilter};
use crate::types::{Buyer, Gift, GiftHistory, Manufacturer, Post, Salary, Sale, Worker};

/// Buyers: natural key is the phone number; delete is a hard delete that
/// detaches the buyer from its sales.
#[async_trait]
pub trait BuyerStorage: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Buyer>>;

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Buyer>>;

    async fn get_by_fio(&self, fio: &str) -> CoreResult<Option<Buyer>>;

    async fn get_by_phone_number(&self, phone_number: &str) -> CoreResult<Option<Buyer>>;

    async fn add(&self, buyer: &Buyer) -> CoreResult<()>;

    async fn update(&self, buyer: &Buyer) -> CoreResult<()>;

    async fn delete(&self, id: &str) -> CoreResult<()>;
}

/// Manufacturers: natural key is the current name.
#[async_trait]
pub trait ManufacturerStorage: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Manufacturer>>;

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Manufacturer>>;

    async fn get_by_name(&self, name: &str) -> CoreResult<Option<Manufacturer>>;

    /// Matches either remembered previous name.
    async fn get_by_old_name(&self, name: &str) -> CoreResult<Option<Manufacturer>>;

    async fn add(&self, manufacturer: &Manufacturer) -> CoreResult<()>;

    /// Renaming shifts the current name into `prev_name`.
    async fn update(&self, manufacturer: &Manufacturer) -> CoreResult<()>;

    /// Fails with `Storage` while an active gift references the manufacturer.
    /// Soft-deleted gifts still hold their foreign key, so the delete is
    /// refused for those too.
    async fn delete(&self, id: &str) -> CoreResult<()>;
}

/// Gifts: soft-deleted, name unique among non-deleted gifts, price history.
#[async_trait]
pub trait GiftStorage: Send + Sync {
    async fn list(&self, filter: &GiftFilter) -> CoreResult<Vec<Gift>>;

    /// Price history, most recent change first.
    async fn get_history(&self, gift_id: &str) -> CoreResult<Vec<GiftHistory>>;

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Gift>>;

    async fn get_by_name(&self, name: &str) -> CoreResult<Option<Gift>>;

    async fn add(&self, gift: &Gift) -> CoreResult<()>;

    /// Appends a history row in the same transaction when the price changes.
    async fn update(&self, gift: &Gift) -> CoreResult<()>;

    async fn delete(&self, id: &str) -> CoreResult<()>;
}

/// Posts: temporal chain of versions sharing a logical id.
#[async_trait]
pub trait PostStorage: Send + Sync {
    /// Actual versions only, or every version of every post.
    async fn list(&self, only_actual: bool) -> CoreResult<Vec<Post>>;

    /// Every version of a post, most recent first.
    async fn get_history(&self, post_id: &str) -> CoreResult<Vec<Post>>;

    async fn get_by_id(&self, post_id: &str) -> CoreResult<Option<Post>>;

    async fn get_by_name(&self, name: &str) -> CoreResult<Option<Post>>;

    async fn add(&self, post: &Post) -> CoreResult<()>;

    /// Deactivates the actual version and appends a new one.
    async fn update(&self, post: &Post) -> CoreResult<()>;

    async fn delete(&self, post_id: &str) -> CoreResult<()>;

    /// Reactivates the most recent version. No-op when already actual.
    async fn restore(&self, post_id: &str) -> CoreResult<()>;
}

/// Workers: soft-deleted.
#[async_trait]
pub trait WorkerStorage: Send + Sync {
    async fn list(&self, filter: &WorkerFilter) -> CoreResult<Vec<Worker>>;

    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Worker>>;

    async fn get_by_fio(&self, fio: &str) -> CoreResult<Option<Worker>>;

    async fn add(&self, worker: &Worker) -> CoreResult<()>;

    async fn update(&self, worker: &Worker) -> CoreResult<()>;

    async fn delete(&self, id: &str) -> CoreResult<()>;
}

/// Sales with their line items. No update; cancel is the only mutation.
#[async_trait]
pub trait SaleStorage: Send + Sync {
    async fn list(&self, filter: &SaleFilter) -> CoreResult<Vec<Sale>>;

    /// Cancelled sales are returned too.
    async fn get_by_id(&self, id: &str) -> CoreResult<Option<Sale>>;

    async fn add(&self, sale: &Sale) -> CoreResult<()>;

    async fn cancel(&self, id: &str) -> CoreResult<()>;
}

/// Payroll: insert and inclusive range query only.
#[async_trait]
pub trait SalaryStorage: Send + Sync {
    async fn list(&self, period: &DateRange, worker_id: Option<&str>) -> CoreResult<Vec<Salary>>;

    async fn add(&self, salary: &Salary) -> CoreResult<()>;

    /// Inserts every salary or none of them.
    async fn add_all(&self, salaries: &[Salary]) -> CoreResult<()>;
}
