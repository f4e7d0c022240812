//! # giftshop-core: Domain Model for the Gift Shop
//!
//! Entities, validation and storage contracts with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gift Shop Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              giftshop-logic (Business-Logic Façade)             │   │
//! │  │   argument checks, loose-key dispatch, logging of every call    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ storage contracts                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ giftshop-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ validation│  │  filter   │  │ contracts │  │   │
//! │  │   │  Gift     │  │  Validate │  │ DateRange │  │ *Storage  │  │   │
//! │  │   │  Post     │  │  phone    │  │ SaleFilter│  │  traits   │  │   │
//! │  │   │  Sale     │  │  age law  │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ implemented by                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 giftshop-db (Database Layer)                    │   │
//! │  │        SQLite repositories, transactions, migrations            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Buyer, Gift, Post, Worker, Sale, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Validation and domain error taxonomy
//! - [`validation`] - Field validators and the [`Validate`] trait
//! - [`filter`] - Composable query filters
//! - [`contracts`] - Async storage traits implemented by giftshop-db
//!
//! ## Example Usage
//!
//! ```rust
//! use giftshop_core::{Gift, GiftType, Money, Validate};
//!
//! let gift = Gift::new(
//!     "Mug",
//!     GiftType::Accessories,
//!     "550e8400-e29b-41d4-a716-446655440000",
//!     Money::from_cents(1000),
//! );
//! assert!(gift.validate().is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod contracts;
pub mod error;
pub mod filter;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use contracts::*;
pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::{DateRange, GiftFilter, SaleFilter, WorkerFilter};
pub use money::Money;
pub use types::*;
pub use validation::Validate;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum age, in whole years, for hiring a worker.
///
/// Checked against both the current date and the employment date.
pub const MIN_WORKER_AGE_YEARS: i64 = 14;

/// Days per year used by the age rule (no leap-year correction).
pub const DAYS_PER_YEAR: i64 = 365;
