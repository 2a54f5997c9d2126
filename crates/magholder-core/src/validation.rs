//! # Validation Module
//!
//! Business-rule checks for pricing tables and order lines.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront                                                   │
//! │  └── Only offers options from the active table                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── validate_pricing_table() before a table is published              │
//! │  └── validate_order_quantity() at checkout                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(variant, version)                                          │
//! │  └── one active table per variant (partial unique index)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use magholder_core::validation::{validate_variant, validate_order_quantity};
//!
//! assert!(validate_variant("glass_holder").is_ok());
//! assert!(validate_order_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::types::{PricingTable, RESERVED_OPTION_KEYS};
use crate::{MAX_IDENTIFIER_LEN, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a variant identifier.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Lowercase ASCII letters, digits and underscores only
///
/// ## Example
/// ```rust
/// use magholder_core::validation::validate_variant;
///
/// assert!(validate_variant("bottle_holder").is_ok());
/// assert!(validate_variant("Bottle Holder").is_err());
/// assert!(validate_variant("").is_err());
/// ```
pub fn validate_variant(variant: &str) -> ValidationResult<()> {
    if variant.is_empty() {
        return Err(ValidationError::Required {
            field: "variant".to_string(),
        });
    }

    if variant.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: "variant".to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    if !variant
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "variant".to_string(),
            reason: "must contain only lowercase letters, digits, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a pricing table version tag.
///
/// The tag is opaque, so only length and whitespace are checked.
pub fn validate_version(version: &str) -> ValidationResult<()> {
    if version.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "version".to_string(),
        });
    }

    if version.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: "version".to_string(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a base price in cents.
///
/// ## Example
/// ```rust
/// use magholder_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(4990).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "base price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the quantity of one checkout line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// Customer enters quantity: 5
///      │
///      ▼
/// validate_order_quantity(5) ← THIS FUNCTION
///      │
///      ├── qty <= 0?  → "quantity must be positive"
///      ├── qty > 999? → "quantity must be between 1 and 999"
///      │
///      └── OK → price the line
/// ```
pub fn validate_order_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Pricing Table Validator
// =============================================================================

/// Validates a pricing table before it is published.
///
/// ## Rules
/// - Variant and version are valid identifiers
/// - Base price is non-negative
/// - No color part is named `finish`, `arm_type`, `module_type` or
///   `pattern_type`, since those keys are taken in the breakdown
///
/// Upcharges may be negative (a cheaper option than the base).
pub fn validate_pricing_table(table: &PricingTable) -> ValidationResult<()> {
    validate_variant(&table.variant)?;
    validate_version(&table.version)?;
    validate_price_cents(table.base_price_cents.cents())?;

    if let Some(part) = table
        .color_prices
        .keys()
        .find(|part| RESERVED_OPTION_KEYS.contains(&part.as_str()))
    {
        return Err(ValidationError::Reserved {
            field: "color part".to_string(),
            value: part.clone(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_validate_variant() {
        assert!(validate_variant("glass_holder").is_ok());
        assert!(validate_variant("holder2").is_ok());

        assert!(validate_variant("").is_err());
        assert!(validate_variant("Glass_Holder").is_err());
        assert!(validate_variant("glass-holder").is_err());
        assert!(validate_variant("glass holder").is_err());
        assert!(validate_variant(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_version() {
        assert!(validate_version("2024-06-01").is_ok());
        assert!(validate_version("v3").is_ok());
        assert!(validate_version("   ").is_err());
        assert!(validate_version(&"9".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_order_quantity() {
        assert!(validate_order_quantity(1).is_ok());
        assert!(validate_order_quantity(999).is_ok());

        assert!(matches!(
            validate_order_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_order_quantity(-3).is_err());
        assert!(matches!(
            validate_order_quantity(1000),
            Err(ValidationError::OutOfRange { min: 1, max: 999, .. })
        ));
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(4990).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }

    #[test]
    fn test_validate_pricing_table() {
        let table = PricingTable::new("glass_holder", "v1", Money::from_cents(4990))
            .with_color("base", "red", Money::from_cents(150))
            .with_finish("glossy", Money::from_cents(-50));
        assert!(validate_pricing_table(&table).is_ok());

        let negative = PricingTable::new("glass_holder", "v1", Money::from_cents(-1));
        assert!(validate_pricing_table(&negative).is_err());

        let no_version = PricingTable::new("glass_holder", "", Money::zero());
        assert!(validate_pricing_table(&no_version).is_err());
    }

    #[test]
    fn test_reserved_color_part_rejected() {
        let table = PricingTable::new("glass_holder", "v1", Money::zero())
            .with_color("arm_type", "black", Money::zero());

        assert_eq!(
            validate_pricing_table(&table),
            Err(ValidationError::Reserved {
                field: "color part".to_string(),
                value: "arm_type".to_string(),
            })
        );

        // a color part named "arm" is fine
        let table = PricingTable::new("glass_holder", "v1", Money::zero())
            .with_color("arm", "black", Money::zero());
        assert!(validate_pricing_table(&table).is_ok());
    }
}
