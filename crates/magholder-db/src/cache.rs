//! # Pricing Cache
//!
//! Serves the active pricing table per variant from memory.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Pricing Cache                                   │
//! │                                                                         │
//! │  active_table("glass_holder")                                          │
//! │       │                                                                 │
//! │       ├── entry fresh (age < ttl)? ──► return cached table             │
//! │       │                                                                 │
//! │       └── missing / stale ──► PricingTableRepository::get_active       │
//! │                                    │                                    │
//! │                                    └──► store entry unless invalidated │
//! │                                         meanwhile, return              │
//! │                                                                         │
//! │  publish(table) ──► repository publish ──► invalidate(variant)         │
//! │  activate_version(v) ──► repository rollback ──► invalidate(variant)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A TTL of zero disables caching: every read goes to the database.
//! Entries only ever hold tables that were active when read, so a stale
//! entry can at worst price against the previous version until the TTL
//! expires or the variant is invalidated.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::pricing::PricingTableRepository;
use magholder_core::PricingTable;

#[derive(Debug, Clone)]
struct CachedTable {
    table: PricingTable,
    fetched_at: Instant,
}

impl CachedTable {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Cached entries plus a generation bumped by every invalidation.
///
/// A read that misses records the generation before fetching and only
/// stores its result if no invalidation happened in between.
#[derive(Debug, Default)]
struct CacheState {
    tables: HashMap<String, CachedTable>,
    generation: u64,
}

impl CacheState {
    fn invalidate(&mut self, variant: &str) {
        self.tables.remove(variant);
        self.generation = self.generation.wrapping_add(1);
    }

    fn invalidate_all(&mut self) {
        self.tables.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Read-through cache over the active pricing tables.
///
/// Share it behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct PricingCache {
    repo: PricingTableRepository,
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl PricingCache {
    pub fn new(repo: PricingTableRepository, ttl: Duration) -> Self {
        PricingCache {
            repo,
            ttl,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Returns the active table for a variant.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - The variant has no active table
    pub async fn active_table(&self, variant: &str) -> DbResult<PricingTable> {
        if self.ttl.is_zero() {
            return self.fetch(variant).await;
        }

        let generation = {
            let state = self.state.read().await;
            if let Some(entry) = state.tables.get(variant) {
                if entry.is_fresh(self.ttl) {
                    debug!(variant = %variant, version = %entry.table.version, "Pricing cache hit");
                    return Ok(entry.table.clone());
                }
            }
            state.generation
        };

        let table = self.fetch(variant).await?;

        let mut state = self.state.write().await;
        if state.generation == generation {
            state.tables.insert(
                variant.to_string(),
                CachedTable {
                    table: table.clone(),
                    fetched_at: Instant::now(),
                },
            );
        } else {
            debug!(variant = %variant, version = %table.version, "Invalidated during fetch, not caching");
        }

        Ok(table)
    }

    async fn fetch(&self, variant: &str) -> DbResult<PricingTable> {
        let table = self
            .repo
            .get_active(variant)
            .await?
            .ok_or_else(|| DbError::not_found("Active pricing table", variant))?;

        debug!(variant = %variant, version = %table.version, "Pricing cache miss");
        Ok(table)
    }

    /// Drops the cached entry for one variant.
    pub async fn invalidate(&self, variant: &str) {
        self.state.write().await.invalidate(variant);
    }

    /// Drops every cached entry.
    pub async fn invalidate_all(&self) {
        self.state.write().await.invalidate_all();
    }

    /// Publishes a table through the repository and invalidates its
    /// variant, so the next read sees the new version.
    pub async fn publish(&self, table: &PricingTable) -> DbResult<PricingTable> {
        let published = self.repo.publish(table).await?;
        self.invalidate(&published.variant).await;
        Ok(published)
    }

    /// Rolls a variant back to an existing version and invalidates it.
    pub async fn activate_version(&self, variant: &str, version: &str) -> DbResult<()> {
        self.repo.activate_version(variant, version).await?;
        self.invalidate(variant).await;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
