//! # Validation Module
//!
//! Field-level checks run before every insert and update.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Business-logic façade                                         │
//! │  ├── Empty arguments, id arguments must be UUIDs                        │
//! │  └── Date ranges (from <= to)                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - entity.validate()                               │
//! │  ├── Fields checked in a fixed order, first failure wins                │
//! │  └── Pure: never touches storage                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── UNIQUE / partial UNIQUE indexes                                    │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use giftshop_core::validation::{validate_uuid, is_phone_number};
//!
//! assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
//! assert!(is_phone_number("+7-777-777-77-77"));
//! ```

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    Buyer, Gift, GiftHistory, GiftType, Manufacturer, Post, PostType, Salary, Sale, SaleGift,
    Worker,
};
use crate::{DAYS_PER_YEAR, MIN_WORKER_AGE_YEARS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

static PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((8|\+7)[\- ]?)?(\(?\d{3}\)?[\- ]?)?[\d\- ]{7,10}$")
        .expect("phone number pattern is valid")
});

// =============================================================================
// Validate Trait
// =============================================================================

/// Implemented by every entity that can be written to a store.
pub trait Validate {
    /// Returns the first failing field, in the entity's declared order.
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// Field Validators
// =============================================================================

/// Rejects empty or whitespace-only strings.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates a required UUID string.
///
/// ## Example
/// ```rust
/// use giftshop_core::validation::validate_uuid;
/// use giftshop_core::ValidationError;
///
/// assert!(matches!(validate_uuid("id", ""), Err(ValidationError::Required { .. })));
/// assert!(matches!(validate_uuid("id", "123"), Err(ValidationError::InvalidFormat { .. })));
/// ```
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    uuid::Uuid::parse_str(value)
        .map_err(|_| ValidationError::invalid_format(field, "must be a valid UUID"))?;

    Ok(())
}

/// True when `value` parses as a UUID.
pub fn is_uuid(value: &str) -> bool {
    uuid::Uuid::parse_str(value).is_ok()
}

/// True when `value` looks like a phone number.
///
/// Accepts an optional `8` or `+7` prefix, an optional three-digit area code
/// (with or without parentheses) and 7 to 10 digits, dashes or spaces.
pub fn is_phone_number(value: &str) -> bool {
    PHONE_NUMBER.is_match(value)
}

/// Validates a required phone number.
pub fn validate_phone_number(field: &str, value: &str) -> ValidationResult<()> {
    validate_required(field, value)?;

    if !is_phone_number(value) {
        return Err(ValidationError::invalid_format(field, "not a phone number"));
    }

    Ok(())
}

/// Validates a strictly positive amount.
pub fn validate_positive_money(field: &str, value: Money) -> ValidationResult<()> {
    if !value.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a strictly positive count.
pub fn validate_positive_count(field: &str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn validate_specified(field: &str, is_none: bool) -> ValidationResult<()> {
    if is_none {
        return Err(ValidationError::Unspecified {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Age Rule
// =============================================================================

/// Whole years between two instants, counted as `days / 365` truncated.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use giftshop_core::validation::full_years;
///
/// let birth = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
/// let now = Utc.with_ymd_and_hms(2014, 1, 10, 0, 0, 0).unwrap();
/// assert_eq!(full_years(birth, now), 14);
/// ```
pub fn full_years(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days() / DAYS_PER_YEAR
}

fn validate_adult(field: &str, birth: DateTime<Utc>, at: DateTime<Utc>) -> ValidationResult<()> {
    if full_years(birth, at) < MIN_WORKER_AGE_YEARS {
        return Err(ValidationError::Underage {
            field: field.to_string(),
            date: at.date_naive().to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Entity Validation
// =============================================================================

impl Validate for Buyer {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_required("fio", &self.fio)?;
        validate_phone_number("phone_number", &self.phone_number)
    }
}

impl Validate for Manufacturer {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_required("name", &self.name)
    }
}

impl Validate for Gift {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_required("name", &self.name)?;
        validate_specified("gift_type", self.gift_type == GiftType::None)?;
        validate_uuid("manufacturer_id", &self.manufacturer_id)?;
        validate_positive_money("price", self.price)
    }
}

impl Validate for GiftHistory {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("gift_id", &self.gift_id)?;
        validate_positive_money("old_price", self.old_price)
    }
}

impl Validate for Post {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_required("name", &self.name)?;
        validate_specified("post_type", self.post_type == PostType::None)?;
        validate_positive_money("salary", self.salary)
    }
}

impl Worker {
    /// Validates against a fixed "now".
    ///
    /// ## Order
    /// ```text
    /// id → id UUID → fio → post_id → post_id UUID
    ///    → age at `now` >= 14
    ///    → employment_date >= birth_date
    ///    → age at employment_date >= 14
    /// ```
    pub fn validate_at(&self, now: DateTime<Utc>) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_required("fio", &self.fio)?;
        validate_uuid("post_id", &self.post_id)?;
        validate_adult("birth_date", self.birth_date, now)?;

        if self.employment_date < self.birth_date {
            return Err(ValidationError::EmploymentBeforeBirth {
                birth_date: self.birth_date.date_naive().to_string(),
                employment_date: self.employment_date.date_naive().to_string(),
            });
        }

        validate_adult("employment_date", self.birth_date, self.employment_date)
    }
}

impl Validate for Worker {
    fn validate(&self) -> ValidationResult<()> {
        self.validate_at(Utc::now())
    }
}

impl Validate for SaleGift {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("sale_id", &self.sale_id)?;
        validate_uuid("gift_id", &self.gift_id)?;
        validate_positive_count("count", self.count)
    }
}

impl Validate for Sale {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("id", &self.id)?;
        validate_uuid("worker_id", &self.worker_id)?;
        if let Some(buyer_id) = &self.buyer_id {
            uuid::Uuid::parse_str(buyer_id)
                .map_err(|_| ValidationError::invalid_format("buyer_id", "must be a valid UUID"))?;
        }
        validate_positive_money("sum", self.sum)?;

        if self.gifts.is_empty() {
            return Err(ValidationError::EmptyCollection {
                field: "gifts".to_string(),
            });
        }
        self.gifts.iter().try_for_each(Validate::validate)
    }
}

impl Validate for Salary {
    fn validate(&self) -> ValidationResult<()> {
        validate_uuid("worker_id", &self.worker_id)?;
        validate_positive_money("salary", self.salary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
