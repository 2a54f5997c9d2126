//! # Repository Module
//!
//! Database repositories for the Magholder store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Repositories                                    │
//! │                                                                         │
//! │  Admin publish                    Checkout                             │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  PricingTableRepository          OrderRepository                       │
//! │  ├── get_active(variant)         ├── create_order(email)               │
//! │  ├── get_version(variant, v)     ├── insert_item(order, sel, bd)       │
//! │  ├── list_versions(variant)      ├── get_items(order)                  │
//! │  ├── publish(table)              ├── mark_paid / cancel                │
//! │  └── activate_version(v)         └── audit_items(order)                │
//! │       │                               │                                 │
//! │       └──────────────┬────────────────┘                                 │
//! │                      ▼                                                  │
//! │               SQLite Database                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`pricing::PricingTableRepository`] - Versioned pricing tables
//! - [`order::OrderRepository`] - Orders and frozen line items

pub mod order;
pub mod pricing;
