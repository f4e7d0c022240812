//! # Domain Types
//!
//! Entities persisted by the gift shop stores.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Manufacturer   │◄──│      Gift       │──►│  GiftHistory    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name (unique)  │   │  name (unique   │   │  old_price      │       │
//! │  │  prev_name      │   │   among active) │   │  change_date    │       │
//! │  │  prev_prev_name │   │  is_deleted     │   │  (append-only)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Post       │◄──│     Worker      │──►│     Salary      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (logical)   │   │  birth_date     │   │  salary_date    │       │
//! │  │  version_id     │   │  employment_date│   │  (append-only)  │       │
//! │  │  is_actual      │   │  is_deleted     │   └─────────────────┘       │
//! │  └─────────────────┘   └────────┬────────┘                              │
//! │                                 │                                       │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │      Buyer      │◄──│      Sale       │──►│    SaleGift     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  phone (unique) │   │  is_cancel      │   │  gift_id, count │       │
//! │  └─────────────────┘   │  gifts (owned)  │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity carries a UUID v4 `id` as a string. Post additionally has a
//! per-row `version_id`; `id` is shared by every version of the same post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Generates a new UUID v4 string id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Enums
// =============================================================================

/// Kind of gift. `None` is the unspecified sentinel and fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum GiftType {
    #[default]
    None,
    Accessories,
    Art,
    Books,
    Chocolate,
    Toys,
}

/// Kind of job title. `None` is the unspecified sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    #[default]
    None,
    Assistant,
    Supervisor,
    Manager,
}

/// Discount applied to a sale. `None` is a valid value here: no discount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[default]
    None,
    OnSale,
    RegularCustomer,
    Certificate,
}

// =============================================================================
// Buyer
// =============================================================================

/// A customer. Unique by phone number, hard-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Buyer {
    pub id: String,
    /// Full name.
    pub fio: String,
    pub phone_number: String,
    /// Personal discount, percent.
    pub discount_size: f64,
}

impl Buyer {
    pub fn new(fio: impl Into<String>, phone_number: impl Into<String>, discount_size: f64) -> Self {
        Self {
            id: new_id(),
            fio: fio.into(),
            phone_number: phone_number.into(),
            discount_size,
        }
    }
}

// =============================================================================
// Manufacturer
// =============================================================================

/// A gift manufacturer that remembers its two previous names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Manufacturer {
    pub id: String,
    pub name: String,
    pub prev_name: Option<String>,
    pub prev_prev_name: Option<String>,
}

impl Manufacturer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            prev_name: None,
            prev_prev_name: None,
        }
    }

    /// Renames the manufacturer, shifting `name → prev_name → prev_prev_name`.
    ///
    /// The oldest prior name is dropped. Does nothing when the name is
    /// unchanged, so repeated saves never lose history.
    ///
    /// ## Example
    /// ```rust
    /// use giftshop_core::Manufacturer;
    ///
    /// let mut m = Manufacturer::new("Acme");
    /// m.rename("Acme Toys");
    /// m.rename("Acme Group");
    /// assert_eq!(m.prev_name.as_deref(), Some("Acme Toys"));
    /// assert_eq!(m.prev_prev_name.as_deref(), Some("Acme"));
    /// ```
    pub fn rename(&mut self, new_name: &str) {
        if self.name == new_name {
            return;
        }
        self.prev_prev_name = self.prev_name.take();
        self.prev_name = Some(std::mem::replace(&mut self.name, new_name.to_string()));
    }

    /// True when `name` is one of the two remembered previous names.
    pub fn was_named(&self, name: &str) -> bool {
        self.prev_name.as_deref() == Some(name) || self.prev_prev_name.as_deref() == Some(name)
    }
}

// =============================================================================
// Gift
// =============================================================================

/// A product for sale. Soft-deleted; name unique among non-deleted gifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Gift {
    pub id: String,
    pub name: String,
    pub gift_type: GiftType,
    pub manufacturer_id: String,
    pub price: Money,
    pub is_deleted: bool,
}

impl Gift {
    pub fn new(
        name: impl Into<String>,
        gift_type: GiftType,
        manufacturer_id: impl Into<String>,
        price: Money,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            gift_type,
            manufacturer_id: manufacturer_id.into(),
            price,
            is_deleted: false,
        }
    }
}

/// Price a gift had before a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct GiftHistory {
    pub gift_id: String,
    pub old_price: Money,
    pub change_date: DateTime<Utc>,
}

impl GiftHistory {
    pub fn new(gift_id: impl Into<String>, old_price: Money) -> Self {
        Self {
            gift_id: gift_id.into(),
            old_price,
            change_date: Utc::now(),
        }
    }
}

// =============================================================================
// Post
// =============================================================================

/// One version of a job title.
///
/// All versions of a post share `id`; each row has its own `version_id`.
/// At most one version per `id` has `is_actual = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Post {
    /// Logical post id, stable across versions.
    pub id: String,
    /// Row id of this version. Assigned by the store on every write.
    pub version_id: String,
    pub name: String,
    pub post_type: PostType,
    pub salary: Money,
    pub is_actual: bool,
    pub change_date: DateTime<Utc>,
}

impl Post {
    pub fn new(name: impl Into<String>, post_type: PostType, salary: Money) -> Self {
        Self {
            id: new_id(),
            version_id: new_id(),
            name: name.into(),
            post_type,
            salary,
            is_actual: true,
            change_date: Utc::now(),
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Worker {
    pub id: String,
    pub fio: String,
    /// Logical id of the worker's post.
    pub post_id: String,
    pub birth_date: DateTime<Utc>,
    pub employment_date: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Worker {
    pub fn new(
        fio: impl Into<String>,
        post_id: impl Into<String>,
        birth_date: DateTime<Utc>,
        employment_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            fio: fio.into(),
            post_id: post_id.into(),
            birth_date,
            employment_date,
            is_deleted: false,
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale and the line items it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub worker_id: String,
    /// Absent for anonymous sales and after the buyer is deleted.
    pub buyer_id: Option<String>,
    pub sale_date: DateTime<Utc>,
    pub sum: Money,
    pub discount_type: DiscountType,
    pub discount: Money,
    pub is_cancel: bool,
    /// Line items, loaded separately from the sale row.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub gifts: Vec<SaleGift>,
}

impl Sale {
    /// Creates an uncancelled sale dated now, with no line items yet.
    pub fn new(
        worker_id: impl Into<String>,
        buyer_id: Option<String>,
        sum: Money,
        discount_type: DiscountType,
        discount: Money,
    ) -> Self {
        Self {
            id: new_id(),
            worker_id: worker_id.into(),
            buyer_id,
            sale_date: Utc::now(),
            sum,
            discount_type,
            discount,
            is_cancel: false,
            gifts: Vec::new(),
        }
    }

    /// Appends a line item bound to this sale.
    pub fn with_gift(mut self, gift_id: impl Into<String>, count: i64) -> Self {
        self.gifts.push(SaleGift {
            sale_id: self.id.clone(),
            gift_id: gift_id.into(),
            count,
        });
        self
    }

    /// True when any line item references `gift_id`.
    pub fn contains_gift(&self, gift_id: &str) -> bool {
        self.gifts.iter().any(|g| g.gift_id == gift_id)
    }
}

/// A line item of a sale. Keyed by `(sale_id, gift_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleGift {
    pub sale_id: String,
    pub gift_id: String,
    pub count: i64,
}

// =============================================================================
// Salary
// =============================================================================

/// One payroll entry. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Salary {
    pub worker_id: String,
    pub salary_date: DateTime<Utc>,
    pub salary: Money,
}

impl Salary {
    pub fn new(worker_id: impl Into<String>, salary_date: DateTime<Utc>, salary: Money) -> Self {
        Self {
            worker_id: worker_id.into(),
            salary_date,
            salary,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
