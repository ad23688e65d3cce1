//! # Error Types
//!
//! Domain-specific error types for gest-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gest-core errors (this file)                                          │
//! │  ├── CoreError        - Draft rule violations                          │
//! │  └── ValidationError  - Input and step-gate failures                   │
//! │                                                                         │
//! │  gest-lookup errors (separate crate)                                   │
//! │  └── LookupError      - Search / submission failures                   │
//! │                                                                         │
//! │  sale-wizard errors (in app)                                           │
//! │  └── AppError         - What the user sees (code + message)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → rendered message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these errors is fatal: every one of them leaves the draft exactly
//! as it was before the rejected operation.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Draft rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Requested quantity exceeds the stock captured for the product.
    ///
    /// ## User Workflow
    /// ```text
    /// Add "Cuaderno" (qty: 5)
    ///      │
    ///      ▼
    /// Stock at selection: 3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Cuaderno", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows the message, the draft is untouched
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Quantity or line total does not fit in cents.
    #[error("Amount too large for {product}")]
    AmountOverflow { product: String },

    /// No line item lives at the given position.
    #[error("No line item at position {0}")]
    LineItemNotFound(usize),

    /// The wizard is already on its last step.
    #[error("Already at the confirmation step")]
    AlreadyAtLastStep,

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation and step-gate failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The draft has no products yet.
    #[error("At least one product must be added")]
    NoLineItems,

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a quantity that is not a number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
