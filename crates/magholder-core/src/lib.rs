//! # magholder-core: Pure Pricing Logic for Magholder
//!
//! This crate prices configured glass and bottle holders. It contains
//! the calculator and everything it needs as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Magholder Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront                                   │   │
//! │  │    Configurator ──► Cart ──► Checkout ──► Order confirmation    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Selection (JSON)                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ magholder-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ calculator │  │ validation│  │   │
//! │  │   │ Pricing-  │  │   Money   │  │ compute_   │  │   rules   │  │   │
//! │  │   │ Table ... │  │           │  │ price      │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 magholder-db (Database Layer)                   │   │
//! │  │         pricing tables, cache, orders, checkout                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - PricingTable, Selection, PriceBreakdown, Order types
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`calculator`] - The price calculator
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same selection and table, same breakdown
//! 2. **No I/O**: the caller fetches the pricing table
//! 3. **Integer Money**: all amounts are cents (i64), arithmetic is checked
//! 4. **No Silent Zero**: an unpriced option is an error, never a free option
//!
//! ## Example Usage
//!
//! ```rust
//! use magholder_core::{compute_price, Money, PricingError, PricingTable, Selection};
//!
//! let table = PricingTable::new("glass_holder", "2024-06", Money::from_cents(4990))
//!     .with_color("base", "red", Money::from_cents(150));
//!
//! let purple = Selection::new("glass_holder").with_color("base", "purple");
//! assert_eq!(
//!     compute_price(&purple, &table),
//!     Err(PricingError::unknown_option("base", "purple"))
//! );
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{compute_price, compute_price_with_fee, price_order_line};
pub use error::{CoreError, CoreResult, PricingError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single order line at checkout.
///
/// ## Business Reason
/// Catches typos (100 instead of 10). The calculator itself has no cap.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of variant identifiers and version tags.
pub const MAX_IDENTIFIER_LEN: usize = 64;
