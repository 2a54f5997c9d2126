//! # Error Types
//!
//! Domain-specific error types for magholder-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  magholder-core errors (this file)                                     │
//! │  ├── PricingError     - Price calculation failures                     │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── CoreError        - Either of the above                            │
//! │                                                                         │
//! │  magholder-db errors (separate crate)                                  │
//! │  └── DbError          - Database failures, wraps the above             │
//! │                                                                         │
//! │  Flow: PricingError → DbError → checkout caller                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Retry Policy
//! Every error here is an input problem: a caller passed the wrong pricing
//! table, or the storefront still offers an option the table no longer
//! prices. None of them is transient and none should be retried.

use thiserror::Error;

// =============================================================================
// Pricing Error
// =============================================================================

/// Failures of [`compute_price`](crate::calculator::compute_price).
///
/// A failed computation produces no breakdown at all, so an order can never
/// be created with an undercounted price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// Quantity is zero or negative.
    #[error("Quantity must be a positive integer, got {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// The selection was priced against another variant's table.
    ///
    /// ## When This Occurs
    /// The caller fetched the wrong table. The calculator never looks up
    /// tables itself.
    #[error("Selection is for variant '{actual}' but pricing table is for '{expected}'")]
    VariantMismatch { expected: String, actual: String },

    /// A selected option has no price in the table.
    ///
    /// ## User Workflow
    /// ```text
    /// Storefront offers base color "purple"
    ///      │
    ///      ▼
    /// Active table has no colorPrices.base.purple
    ///      │
    ///      ▼
    /// UnknownOptionValue { category: "base", value: "purple" }
    ///      │
    ///      ▼
    /// Checkout refused, pricing table needs fixing
    /// ```
    #[error("No price for {category} option '{value}'")]
    UnknownOptionValue { category: String, value: String },

    /// A sum or the quantity multiplication left the i64 range.
    #[error("Price amount overflowed")]
    AmountOverflow,

    /// Negative upcharges or a negative custom fee pushed the unit price
    /// below zero.
    #[error("Unit price cannot be negative, got {unit_price_cents} cents")]
    NegativeUnitPrice { unit_price_cents: i64 },
}

impl PricingError {
    pub fn unknown_option(category: impl Into<String>, value: impl Into<String>) -> Self {
        PricingError::UnknownOptionValue {
            category: category.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a pricing table or order item reaches the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., uppercase variant id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A name collides with a reserved breakdown key.
    #[error("{field} '{value}' is reserved")]
    Reserved { field: String, value: String },
}

// =============================================================================
// Core Error
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
