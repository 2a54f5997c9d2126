//! # Price Calculator
//!
//! Turns a [`Selection`] and the active [`PricingTable`] for its variant
//! into a [`PriceBreakdown`].
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  compute_price(selection, table)                                        │
//! │                                                                         │
//! │  quantity <= 0?            ──► InvalidQuantity                          │
//! │  variant != table.variant? ──► VariantMismatch                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  base = table.base_price_cents                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  colors:  part in both maps → colorPrices[part][color]                 │
//! │  finish, arm_type, module_type, pattern_type: only when selected       │
//! │       │   (missing price ──► UnknownOptionValue, never 0)              │
//! │       ▼                                                                 │
//! │  unit     = base + Σ options + custom fee                              │
//! │  subtotal = unit × quantity                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All arithmetic is checked; nothing wraps or rounds.
//!
//! ## Example
//! ```rust
//! use magholder_core::calculator::compute_price;
//! use magholder_core::{Money, PricingTable, Selection};
//!
//! let table = PricingTable::new("glass_holder", "2024-06", Money::from_cents(4990))
//!     .with_color("base", "green", Money::zero())
//!     .with_color("base", "red", Money::from_cents(150))
//!     .with_finish("matte", Money::zero())
//!     .with_finish("glossy", Money::from_cents(200));
//!
//! let selection = Selection::new("glass_holder")
//!     .with_color("base", "red")
//!     .with_finish("glossy")
//!     .with_quantity(2);
//!
//! let breakdown = compute_price(&selection, &table).unwrap();
//! assert_eq!(breakdown.unit_price_cents.cents(), 5340);
//! assert_eq!(breakdown.subtotal_cents.cents(), 10680);
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreResult, PricingError};
use crate::money::Money;
use crate::types::{OptionCategory, PriceBreakdown, PricingTable, Selection};
use crate::validation::validate_order_quantity;

/// Result type for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;

/// Prices a selection with no custom fee.
pub fn compute_price(selection: &Selection, table: &PricingTable) -> PricingResult<PriceBreakdown> {
    compute_price_with_fee(selection, table, Money::zero())
}

/// Prices a selection with an administrative flat fee added to the unit
/// price. A negative fee is a discount, but the unit price may not go
/// below zero.
pub fn compute_price_with_fee(
    selection: &Selection,
    table: &PricingTable,
    custom_fee: Money,
) -> PricingResult<PriceBreakdown> {
    if selection.quantity <= 0 {
        return Err(PricingError::InvalidQuantity {
            quantity: selection.quantity,
        });
    }

    if selection.variant != table.variant {
        return Err(PricingError::VariantMismatch {
            expected: table.variant.clone(),
            actual: selection.variant.clone(),
        });
    }

    let mut option_prices = BTreeMap::new();

    for (part, color) in &selection.colors {
        // Unpriced parts are not an error
        let Some(colors) = table.color_prices.get(part) else {
            continue;
        };
        let upcharge = colors
            .get(color)
            .ok_or_else(|| PricingError::unknown_option(part.as_str(), color.as_str()))?;
        option_prices.insert(part.clone(), *upcharge);
    }

    for (category, value) in selection.structural_options() {
        let upcharge = lookup_structural(table, &category, value)?;
        option_prices.insert(category.key().to_string(), upcharge);
    }

    let unit_price = option_prices
        .values()
        .try_fold(table.base_price_cents, |acc: Money, upcharge| {
            acc.checked_add(*upcharge)
        })
        .and_then(|unit| unit.checked_add(custom_fee))
        .ok_or(PricingError::AmountOverflow)?;

    if unit_price.is_negative() {
        return Err(PricingError::NegativeUnitPrice {
            unit_price_cents: unit_price.cents(),
        });
    }

    let subtotal = unit_price
        .checked_mul_quantity(selection.quantity)
        .ok_or(PricingError::AmountOverflow)?;

    Ok(PriceBreakdown {
        base_price_cents: table.base_price_cents,
        option_prices_cents: option_prices,
        custom_fee_cents: custom_fee,
        unit_price_cents: unit_price,
        subtotal_cents: subtotal,
        pricing_version: table.version.clone(),
    })
}

/// Prices one checkout line: applies the order quantity cap, then
/// computes the breakdown.
pub fn price_order_line(
    selection: &Selection,
    table: &PricingTable,
    custom_fee: Money,
) -> CoreResult<PriceBreakdown> {
    // The calculator accepts any positive quantity; checkout is stricter
    if selection.quantity > 0 {
        validate_order_quantity(selection.quantity)?;
    }
    Ok(compute_price_with_fee(selection, table, custom_fee)?)
}

fn lookup_structural(
    table: &PricingTable,
    category: &OptionCategory,
    value: &str,
) -> PricingResult<Money> {
    table
        .structural_prices(category)
        .and_then(|prices| prices.get(value))
        .copied()
        .ok_or_else(|| PricingError::unknown_option(category.key(), value))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};

    fn glass_table() -> PricingTable {
        PricingTable::new("glass_holder", "2024-06", Money::from_cents(4990))
            .with_color("base", "green", Money::zero())
            .with_color("base", "red", Money::from_cents(150))
            .with_finish("matte", Money::zero())
            .with_finish("glossy", Money::from_cents(200))
    }

    fn full_table() -> PricingTable {
        glass_table()
            .with_color("arm", "black", Money::from_cents(75))
            .with_arm("short", Money::zero())
            .with_arm("long", Money::from_cents(300))
            .with_module("single", Money::zero())
            .with_module("double", Money::from_cents(900))
            .with_pattern("plain", Money::zero())
            .with_pattern("hex", Money::from_cents(250))
    }

    #[test]
    fn test_red_glossy_pair() {
        let selection = Selection::new("glass_holder")
            .with_color("base", "red")
            .with_finish("glossy")
            .with_quantity(2);

        let breakdown = compute_price(&selection, &glass_table()).unwrap();

        assert_eq!(breakdown.base_price_cents.cents(), 4990);
        assert_eq!(breakdown.option_prices_cents["base"].cents(), 150);
        assert_eq!(breakdown.option_prices_cents["finish"].cents(), 200);
        assert_eq!(breakdown.unit_price_cents.cents(), 5340);
        assert_eq!(breakdown.subtotal_cents.cents(), 10680);
        assert_eq!(breakdown.pricing_version, "2024-06");
    }

    #[test]
    fn test_unknown_color_is_rejected() {
        let selection = Selection::new("glass_holder").with_color("base", "purple");

        let err = compute_price(&selection, &glass_table()).unwrap_err();

        assert_eq!(
            err,
            PricingError::UnknownOptionValue {
                category: "base".to_string(),
                value: "purple".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_and_negative_quantity_rejected() {
        for quantity in [0, -1, i64::MIN] {
            let selection = Selection::new("glass_holder").with_quantity(quantity);
            let err = compute_price(&selection, &glass_table()).unwrap_err();
            assert_eq!(err, PricingError::InvalidQuantity { quantity });
        }
    }

    #[test]
    fn test_variant_mismatch() {
        let selection = Selection::new("bottle_holder");

        let err = compute_price(&selection, &glass_table()).unwrap_err();

        assert_eq!(
            err,
            PricingError::VariantMismatch {
                expected: "glass_holder".to_string(),
                actual: "bottle_holder".to_string(),
            }
        );
    }

    #[test]
    fn test_base_only_selection() {
        let table = glass_table();
        let breakdown = compute_price(&Selection::new("glass_holder"), &table).unwrap();

        assert!(breakdown.option_prices_cents.is_empty());
        assert_eq!(breakdown.unit_price_cents, table.base_price_cents);
        assert_eq!(breakdown.subtotal_cents, table.base_price_cents);
        assert!(breakdown.custom_fee_cents.is_zero());
    }

    #[test]
    fn test_unpriced_part_is_ignored() {
        let selection = Selection::new("glass_holder")
            .with_color("base", "green")
            .with_color("magnet", "silver");

        let breakdown = compute_price(&selection, &glass_table()).unwrap();

        assert_eq!(breakdown.option_prices_cents.len(), 1);
        assert!(breakdown.option_prices_cents.contains_key("base"));
        assert_eq!(breakdown.unit_price_cents.cents(), 4990);
    }

    #[test]
    fn test_zero_upcharge_still_recorded() {
        let selection = Selection::new("glass_holder").with_finish("matte");

        let breakdown = compute_price(&selection, &glass_table()).unwrap();

        assert_eq!(breakdown.option_prices_cents.get("finish"), Some(&Money::zero()));
    }

    #[test]
    fn test_every_category_is_additive() {
        let selection = Selection::new("glass_holder")
            .with_color("base", "red")
            .with_color("arm", "black")
            .with_finish("glossy")
            .with_arm_type("long")
            .with_module_type("double")
            .with_pattern_type("hex")
            .with_quantity(3);

        let breakdown = compute_price(&selection, &full_table()).unwrap();

        // color part "arm" and structural "arm_type" are separate entries
        assert_eq!(breakdown.option_prices_cents["arm"].cents(), 75);
        assert_eq!(breakdown.option_prices_cents["arm_type"].cents(), 300);
        assert_eq!(breakdown.option_prices_cents["module_type"].cents(), 900);
        assert_eq!(breakdown.option_prices_cents["pattern_type"].cents(), 250);

        let options: Money = breakdown.option_prices_cents.values().sum();
        assert_eq!(
            breakdown.unit_price_cents,
            breakdown.base_price_cents + options + breakdown.custom_fee_cents
        );
        assert_eq!(breakdown.unit_price_cents.cents(), 4990 + 150 + 75 + 200 + 300 + 900 + 250);
        assert_eq!(
            breakdown.subtotal_cents.cents(),
            breakdown.unit_price_cents.cents() * 3
        );
        assert!(breakdown.is_consistent(3));
    }

    #[test]
    fn test_unknown_structural_options_name_their_category() {
        let table = full_table();
        let cases = [
            (Selection::new("glass_holder").with_finish("satin"), "finish", "satin"),
            (Selection::new("glass_holder").with_arm_type("xl"), "arm_type", "xl"),
            (Selection::new("glass_holder").with_module_type("triple"), "module_type", "triple"),
            (Selection::new("glass_holder").with_pattern_type("wave"), "pattern_type", "wave"),
        ];

        for (selection, category, value) in cases {
            let err = compute_price(&selection, &table).unwrap_err();
            assert_eq!(err, PricingError::unknown_option(category, value));
        }
    }

    #[test]
    fn test_structural_option_against_empty_map() {
        // glass_table() prices no arm types at all
        let selection = Selection::new("glass_holder").with_arm_type("short");

        let err = compute_price(&selection, &glass_table()).unwrap_err();

        assert_eq!(err, PricingError::unknown_option("arm_type", "short"));
    }

    #[test]
    fn test_deterministic_output() {
        let selection = Selection::new("glass_holder")
            .with_color("base", "red")
            .with_color("arm", "black")
            .with_finish("glossy")
            .with_quantity(4);
        let table = full_table();

        let first = compute_price(&selection, &table).unwrap();
        let second = compute_price(&selection, &table).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_variant_isolation() {
        let glass = glass_table();
        let bottle = PricingTable::new("bottle_holder", "2024-06", Money::from_cents(3990))
            .with_color("base", "red", Money::from_cents(999))
            .with_finish("glossy", Money::from_cents(999));

        let glass_selection = Selection::new("glass_holder")
            .with_color("base", "red")
            .with_finish("glossy");
        let bottle_selection = Selection::new("bottle_holder")
            .with_color("base", "red")
            .with_finish("glossy");

        let glass_price = compute_price(&glass_selection, &glass).unwrap();
        let bottle_price = compute_price(&bottle_selection, &bottle).unwrap();

        assert_eq!(glass_price.unit_price_cents.cents(), 5340);
        assert_eq!(bottle_price.unit_price_cents.cents(), 3990 + 999 + 999);
    }

    #[test]
    fn test_quantity_scaling() {
        let table = glass_table();
        for quantity in [1, 2, 7, 999, 100_000] {
            let selection = Selection::new("glass_holder")
                .with_color("base", "red")
                .with_quantity(quantity);
            let breakdown = compute_price(&selection, &table).unwrap();
            assert_eq!(breakdown.subtotal_cents.cents(), 5140 * quantity);
        }
    }

    #[test]
    fn test_custom_fee_is_added() {
        let selection = Selection::new("glass_holder").with_quantity(2);

        let breakdown =
            compute_price_with_fee(&selection, &glass_table(), Money::from_cents(500)).unwrap();

        assert_eq!(breakdown.custom_fee_cents.cents(), 500);
        assert_eq!(breakdown.unit_price_cents.cents(), 5490);
        assert_eq!(breakdown.subtotal_cents.cents(), 10980);
    }

    #[test]
    fn test_custom_fee_cannot_make_price_negative() {
        let selection = Selection::new("glass_holder");

        let err = compute_price_with_fee(&selection, &glass_table(), Money::from_cents(-5000))
            .unwrap_err();

        assert_eq!(err, PricingError::NegativeUnitPrice { unit_price_cents: -10 });
    }

    #[test]
    fn test_negative_upcharges_cannot_make_price_negative() {
        let table = PricingTable::new("glass_holder", "v1", Money::from_cents(500))
            .with_color("base", "clearance", Money::from_cents(-300))
            .with_finish("raw", Money::from_cents(-400));
        let selection = Selection::new("glass_holder")
            .with_color("base", "clearance")
            .with_finish("raw");

        let err = compute_price(&selection, &table).unwrap_err();
        assert_eq!(err, PricingError::NegativeUnitPrice { unit_price_cents: -200 });

        // A cheaper option alone is fine as long as the unit stays >= 0
        let partial = Selection::new("glass_holder").with_color("base", "clearance");
        let breakdown = compute_price(&partial, &table).unwrap();
        assert_eq!(breakdown.unit_price_cents.cents(), 200);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let table = PricingTable::new("glass_holder", "v1", Money::from_cents(i64::MAX))
            .with_finish("glossy", Money::from_cents(1));

        let err = compute_price(&Selection::new("glass_holder").with_finish("glossy"), &table)
            .unwrap_err();
        assert_eq!(err, PricingError::AmountOverflow);

        let err = compute_price(&Selection::new("glass_holder").with_quantity(2), &table)
            .unwrap_err();
        assert_eq!(err, PricingError::AmountOverflow);
    }

    #[test]
    fn test_price_order_line_applies_quantity_cap() {
        let table = glass_table();

        let ok = price_order_line(&Selection::new("glass_holder").with_quantity(999), &table, Money::zero());
        assert!(ok.is_ok());

        let err = price_order_line(&Selection::new("glass_holder").with_quantity(1000), &table, Money::zero())
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));

        let err = price_order_line(&Selection::new("glass_holder").with_quantity(0), &table, Money::zero())
            .unwrap_err();
        assert_eq!(err, CoreError::Pricing(PricingError::InvalidQuantity { quantity: 0 }));
    }
}
