//! # Domain Types
//!
//! Pricing and order types shared by the storefront, the calculator and
//! the database layer.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PricingTable   │   │    Selection    │   │ PriceBreakdown  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  variant        │◄──│  variant        │   │  base           │       │
//! │  │  base price     │   │  colors         │──►│  options        │       │
//! │  │  *_prices       │   │  finish, arm... │   │  unit, subtotal │       │
//! │  │  active/version │   │  quantity       │   │  pricingVersion │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │ owned by       │
//! │  ┌─────────────────┐   ┌─────────────────┐            ▼                │
//! │  │      Order      │──►│   OrderItem     │  exactly one breakdown      │
//! │  │  status         │   │  selection      │  per item, never            │
//! │  │  order_number   │   │  breakdown      │  recomputed                 │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//! Every map is a `BTreeMap`, so two equal values always serialize to the
//! same bytes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Option Categories
// =============================================================================

/// Breakdown key for the finish upcharge.
pub const FINISH_KEY: &str = "finish";
/// Breakdown key for the arm type upcharge.
pub const ARM_TYPE_KEY: &str = "arm_type";
/// Breakdown key for the module type upcharge.
pub const MODULE_TYPE_KEY: &str = "module_type";
/// Breakdown key for the pattern type upcharge.
pub const PATTERN_TYPE_KEY: &str = "pattern_type";

/// Keys used by the non-color categories. A color part may not reuse one,
/// or two upcharges would land on the same breakdown entry.
pub const RESERVED_OPTION_KEYS: [&str; 4] =
    [FINISH_KEY, ARM_TYPE_KEY, MODULE_TYPE_KEY, PATTERN_TYPE_KEY];

/// A pricing dimension within a variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionCategory {
    /// Color of a named part (`base`, `arm`, `module`, `pattern`, ...).
    Color(String),
    Finish,
    ArmType,
    ModuleType,
    PatternType,
}

impl OptionCategory {
    /// Key under which this category appears in
    /// [`PriceBreakdown::option_prices_cents`] and in error diagnostics.
    pub fn key(&self) -> &str {
        match self {
            OptionCategory::Color(part) => part.as_str(),
            OptionCategory::Finish => FINISH_KEY,
            OptionCategory::ArmType => ARM_TYPE_KEY,
            OptionCategory::ModuleType => MODULE_TYPE_KEY,
            OptionCategory::PatternType => PATTERN_TYPE_KEY,
        }
    }
}

impl fmt::Display for OptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Pricing Table
// =============================================================================

/// Upcharges for one option category, keyed by option name.
pub type PriceMap = BTreeMap<String, Money>;

/// The versioned price list for one product variant.
///
/// ## Invariants (maintained by the store, assumed here)
/// - At most one table per variant has `active = true`
/// - `version` is recorded on every order priced with this table and is
///   never used in the computation itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingTable {
    /// Variant identifier, e.g. `glass_holder`.
    pub variant: String,

    /// Price of the variant before any option.
    pub base_price_cents: Money,

    /// part name → color name → upcharge.
    #[serde(default)]
    pub color_prices: BTreeMap<String, PriceMap>,

    #[serde(default)]
    pub finish_prices: PriceMap,

    #[serde(default)]
    pub arm_prices: PriceMap,

    #[serde(default)]
    pub module_prices: PriceMap,

    #[serde(default)]
    pub pattern_prices: PriceMap,

    #[serde(default)]
    pub active: bool,

    /// Opaque audit tag.
    pub version: String,
}

impl PricingTable {
    /// Creates an inactive table with no options.
    pub fn new(variant: impl Into<String>, version: impl Into<String>, base_price: Money) -> Self {
        PricingTable {
            variant: variant.into(),
            base_price_cents: base_price,
            color_prices: BTreeMap::new(),
            finish_prices: PriceMap::new(),
            arm_prices: PriceMap::new(),
            module_prices: PriceMap::new(),
            pattern_prices: PriceMap::new(),
            active: false,
            version: version.into(),
        }
    }

    /// Adds or replaces a color upcharge for a part.
    pub fn with_color(mut self, part: &str, color: &str, upcharge: Money) -> Self {
        self.color_prices
            .entry(part.to_string())
            .or_default()
            .insert(color.to_string(), upcharge);
        self
    }

    pub fn with_finish(mut self, finish: &str, upcharge: Money) -> Self {
        self.finish_prices.insert(finish.to_string(), upcharge);
        self
    }

    pub fn with_arm(mut self, arm_type: &str, upcharge: Money) -> Self {
        self.arm_prices.insert(arm_type.to_string(), upcharge);
        self
    }

    pub fn with_module(mut self, module_type: &str, upcharge: Money) -> Self {
        self.module_prices.insert(module_type.to_string(), upcharge);
        self
    }

    pub fn with_pattern(mut self, pattern_type: &str, upcharge: Money) -> Self {
        self.pattern_prices.insert(pattern_type.to_string(), upcharge);
        self
    }

    /// Price map for a structural category. `None` for colors, whose prices
    /// are nested per part.
    pub fn structural_prices(&self, category: &OptionCategory) -> Option<&PriceMap> {
        match category {
            OptionCategory::Color(_) => None,
            OptionCategory::Finish => Some(&self.finish_prices),
            OptionCategory::ArmType => Some(&self.arm_prices),
            OptionCategory::ModuleType => Some(&self.module_prices),
            OptionCategory::PatternType => Some(&self.pattern_prices),
        }
    }
}

// =============================================================================
// Selection
// =============================================================================

fn default_quantity() -> i64 {
    1
}

/// The customer's configuration for one order line.
///
/// `quantity` is a signed integer so that zero and negative values reach
/// the calculator and are rejected there with a typed error; a fractional
/// quantity fails deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Selection {
    pub variant: String,

    /// part name → color name. Parts the table does not price are ignored.
    #[serde(default)]
    pub colors: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub finish: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub arm_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub module_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub pattern_type: Option<String>,

    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

impl Selection {
    /// A base-only selection of one unit.
    pub fn new(variant: impl Into<String>) -> Self {
        Selection {
            variant: variant.into(),
            colors: BTreeMap::new(),
            finish: None,
            arm_type: None,
            module_type: None,
            pattern_type: None,
            quantity: default_quantity(),
        }
    }

    pub fn with_color(mut self, part: &str, color: &str) -> Self {
        self.colors.insert(part.to_string(), color.to_string());
        self
    }

    pub fn with_finish(mut self, finish: &str) -> Self {
        self.finish = Some(finish.to_string());
        self
    }

    pub fn with_arm_type(mut self, arm_type: &str) -> Self {
        self.arm_type = Some(arm_type.to_string());
        self
    }

    pub fn with_module_type(mut self, module_type: &str) -> Self {
        self.module_type = Some(module_type.to_string());
        self
    }

    pub fn with_pattern_type(mut self, pattern_type: &str) -> Self {
        self.pattern_type = Some(pattern_type.to_string());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Structural options that are set, in breakdown order.
    pub fn structural_options(&self) -> impl Iterator<Item = (OptionCategory, &str)> {
        [
            (OptionCategory::Finish, self.finish.as_deref()),
            (OptionCategory::ArmType, self.arm_type.as_deref()),
            (OptionCategory::ModuleType, self.module_type.as_deref()),
            (OptionCategory::PatternType, self.pattern_type.as_deref()),
        ]
        .into_iter()
        .filter_map(|(category, value)| value.map(|v| (category, v)))
    }
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// The itemized price of one order line, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceBreakdown {
    pub base_price_cents: Money,

    /// Upcharge per priced category: part name for colors, `finish`,
    /// `arm_type`, `module_type`, `pattern_type` for the rest.
    pub option_prices_cents: BTreeMap<String, Money>,

    #[serde(default)]
    pub custom_fee_cents: Money,

    /// base + options + custom fee.
    pub unit_price_cents: Money,

    /// unit × quantity.
    pub subtotal_cents: Money,

    /// Version of the table used, for audit.
    pub pricing_version: String,
}

impl PriceBreakdown {
    /// Re-checks additivity and quantity scaling.
    ///
    /// Used when reconciling stored order items: a stored breakdown whose
    /// parts no longer add up has been tampered with or mis-migrated.
    pub fn is_consistent(&self, quantity: i64) -> bool {
        let options = self
            .option_prices_cents
            .values()
            .try_fold(Money::zero(), |acc, upcharge| acc.checked_add(*upcharge));

        let unit = options
            .and_then(|o| o.checked_add(self.base_price_cents))
            .and_then(|u| u.checked_add(self.custom_fee_cents));

        match unit {
            Some(unit) if unit == self.unit_price_cents => {
                quantity > 0 && unit.checked_mul_quantity(quantity) == Some(self.subtotal_cents)
            }
            _ => false,
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
///
/// ```text
/// Pending ──mark_paid──► Paid
///    │                    │
///    └──────cancel────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Items may still be added.
    Pending,
    /// Payment captured.
    Paid,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// The single canonical order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-readable number shown in emails: `MH-YYYYMMDD-NNNN`.
    pub order_number: String,
    pub status: OrderStatus,
    pub customer_email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Item
// =============================================================================

/// A priced order line.
/// Uses the snapshot pattern: the selection and its breakdown are frozen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// 1-based position within the order.
    pub line_number: i64,
    pub selection: Selection,
    pub breakdown: PriceBreakdown,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.breakdown.subtotal_cents
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
