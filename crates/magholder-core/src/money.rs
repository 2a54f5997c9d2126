//! # Money Module
//!
//! Provides the `Money` type for prices, upcharges and subtotals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Pricing tables in the storefront were once summed as floats:          │
//! │    49.90 + 1.50 + 2.00 = 53.400000000000006  ❌                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    4990 + 150 + 200 = 5340 cents, exactly                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use magholder_core::money::Money;
//!
//! let base = Money::from_cents(4990); // $49.90
//! let upcharge = Money::from_cents(150);
//!
//! let unit = base.checked_add(upcharge).unwrap();
//! assert_eq!(unit.cents(), 5140);
//!
//! let subtotal = unit.checked_mul_quantity(2).unwrap();
//! assert_eq!(subtotal.to_string(), "$102.80");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Serializes as a bare integer, so `basePriceCents: 4990` in JSON maps
/// directly onto `Money::from_cents(4990)`.
///
/// ## Where Money is Used
/// ```text
/// PricingTable.base_price_cents ──┐
/// PricingTable.*_prices (upcharges)┼──► PriceBreakdown.unit_price_cents
/// custom fee (admin override) ─────┘            │
///                                               ▼  × quantity
///                                    PriceBreakdown.subtotal_cents
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use magholder_core::money::Money;
    ///
    /// let price = Money::from_cents(4990); // $49.90
    /// assert_eq!(price.cents(), 4990);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, returning `None` on i64 overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use magholder_core::money::Money;
    ///
    /// let unit = Money::from_cents(5340);
    /// assert_eq!(unit.checked_mul_quantity(2), Some(Money::from_cents(10680)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as dollars for logs and error messages.
///
/// ## Note
/// The storefront formats prices itself for localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// Unchecked addition, for values already known to be small
/// (the calculator itself always uses `checked_add`).
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(4990);
        assert_eq!(money.cents(), 4990);
        assert_eq!(i64::from(money), 4990);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(4990).to_string(), "$49.90");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-150).to_string(), "-$1.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(
            Money::from_cents(i64::MIN).to_string(),
            "-$92233720368547758.08"
        );
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_cents(4990);
        let b = Money::from_cents(150);
        assert_eq!(a.checked_add(b), Some(Money::from_cents(5140)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(b), None);
    }

    #[test]
    fn test_checked_mul_quantity() {
        let unit = Money::from_cents(5340);
        assert_eq!(unit.checked_mul_quantity(2), Some(Money::from_cents(10680)));
        assert_eq!(unit.checked_mul_quantity(1), Some(unit));
        assert_eq!(Money::from_cents(i64::MAX / 2 + 1).checked_mul_quantity(2), None);
    }

    #[test]
    fn test_sum() {
        let values = [
            Money::from_cents(150),
            Money::from_cents(200),
            Money::from_cents(0),
        ];
        let total: Money = values.iter().sum();
        assert_eq!(total.cents(), 350);

        let empty: Money = std::iter::empty::<Money>().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_cents(4990)).unwrap();
        assert_eq!(json, "4990");

        let back: Money = serde_json::from_str("150").unwrap();
        assert_eq!(back, Money::from_cents(150));
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_negative());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::default(), Money::zero());
    }
}
