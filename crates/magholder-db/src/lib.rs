//! # magholder-db: Store Layer for Magholder
//!
//! SQLite persistence for pricing tables and orders, using sqlx for async
//! access. All SQL lives in this crate; pricing math lives in
//! `magholder-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Magholder Data Flow                              │
//! │                                                                         │
//! │  Storefront / admin handler                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   magholder-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐   ┌───────────────┐   ┌──────────────────┐   │   │
//! │  │   │  Checkout   │──►│ PricingCache  │──►│ PricingTableRepo │   │   │
//! │  │   │             │   │  (TTL, RwLock)│   │                  │   │   │
//! │  │   │             │   └───────────────┘   └──────────────────┘   │   │
//! │  │   │             │──────────────────────►┌──────────────────┐   │   │
//! │  │   └─────────────┘                       │ OrderRepository  │   │   │
//! │  │          │                              └──────────────────┘   │   │
//! │  │          ▼                                                      │   │
//! │  │   magholder_core::price_order_line (pure)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) with embedded migrations                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven store configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Pricing table and order repositories
//! - [`cache`] - Active pricing table cache
//! - [`checkout`] - Pricing a selection into an order line
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use magholder_db::{Checkout, Database, PricingCache, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let cache = Arc::new(PricingCache::new(db.pricing_tables(), config.pricing_cache_ttl));
//! let checkout = Checkout::new(db.orders(), Arc::clone(&cache));
//!
//! let order = db.orders().create_order(Some("buyer@example.com")).await?;
//! let item = checkout.add_item(&order.id, &selection, Money::zero()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod checkout;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::PricingCache;
pub use checkout::Checkout;
pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::pricing::PricingTableRepository;
