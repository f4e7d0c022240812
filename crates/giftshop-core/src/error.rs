//! # Error Types
//!
//! Domain-specific error types shared by every layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  giftshop-core (this file)                                              │
//! │  ├── ValidationError  - A field fails a declared invariant              │
//! │  └── CoreError        - Everything a store or service can return        │
//! │      ├── Validation        (wraps ValidationError)                      │
//! │      ├── EmptyArgument     (façade argument check)                      │
//! │      ├── IncorrectDates    (from > to)                                  │
//! │      ├── ElementNotFound   (no active row)                              │
//! │      ├── ElementDeleted    (row exists, terminal state)                 │
//! │      ├── ElementExists     (uniqueness would be violated)               │
//! │      └── Storage           (engine fault, cause kept as source)         │
//! │                                                                         │
//! │  giftshop-db                                                            │
//! │  └── DbError          - sqlx faults, converted into CoreError::Storage  │
//! │                                                                         │
//! │  Flow: sqlx::Error → DbError → CoreError → caller                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, value)
//! 3. Validation and domain errors never wrap an engine fault
//! 4. Engine faults keep their cause, but never as the primary message

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Boxed engine error carried inside [`CoreError::Storage`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level validation failures.
///
/// Each entity checks its fields in a fixed order and reports the first
/// failure, so the message for a given record is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Invalid format (e.g., not a UUID, not a phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// An enum field still holds its `None` sentinel.
    #[error("{field} is not specified")]
    Unspecified { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A collection that must own at least one element is empty.
    #[error("{field} must contain at least one item")]
    EmptyCollection { field: String },

    /// A worker would be younger than the minimum hiring age.
    #[error("Minors cannot be hired ({field} = {date})")]
    Underage { field: String, date: String },

    /// Employment date precedes birth date.
    #[error("employment_date {employment_date} is earlier than birth_date {birth_date}")]
    EmploymentBeforeBirth {
        birth_date: String,
        employment_date: String,
    },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error for a field.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the field that failed.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::Unspecified { field }
            | ValidationError::MustBePositive { field }
            | ValidationError::EmptyCollection { field }
            | ValidationError::Underage { field, .. } => field,
            ValidationError::EmploymentBeforeBirth { .. } => "employment_date",
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Errors returned by storage contracts and the business-logic façade.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input failed validation. Always raised before any write.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A required argument was empty.
    #[error("Argument {name} is empty")]
    EmptyArgument { name: String },

    /// A date range whose start lies after its end.
    #[error("Incorrect dates: from {from} is later than to {to}")]
    IncorrectDates {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// The operation targets an id with no matching active row.
    #[error("Element not found: {id}")]
    ElementNotFound { id: String },

    /// The row exists but is already in a terminal state for the operation.
    ///
    /// ## When This Occurs
    /// - Deleting an already soft-deleted gift or worker
    /// - Deleting or updating a post with no actual version
    /// - Cancelling an already cancelled sale
    #[error("Element is deleted: {id}")]
    ElementDeleted { id: String },

    /// A uniqueness invariant would be violated.
    #[error("Element with {field} '{value}' already exists")]
    ElementExists { field: String, value: String },

    /// Unexpected engine fault. The raw cause is available via `source()`.
    #[error("Storage failure while {context}")]
    Storage {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl CoreError {
    /// Creates an ElementNotFound error.
    pub fn not_found(id: impl Into<String>) -> Self {
        CoreError::ElementNotFound { id: id.into() }
    }

    /// Creates an ElementDeleted error.
    pub fn deleted(id: impl Into<String>) -> Self {
        CoreError::ElementDeleted { id: id.into() }
    }

    /// Creates an ElementExists error naming the violated field.
    pub fn exists(field: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::ElementExists {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wraps an engine fault with a short description of the operation.
    pub fn storage(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CoreError::Storage {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Creates an EmptyArgument error.
    pub fn empty_argument(name: impl Into<String>) -> Self {
        CoreError::EmptyArgument { name: name.into() }
    }

    /// True for infrastructure faults, false for validation/domain errors.
    pub fn is_storage(&self) -> bool {
        matches!(self, CoreError::Storage { .. })
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
