//! # Pricing Table Repository
//!
//! Versioned pricing tables, one active table per variant.
//!
//! ## Publishing a New Version
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   publish(glass_holder @ 2024-07)                       │
//! │                                                                         │
//! │  ┌─────────────────── SINGLE TRANSACTION ───────────────────────────┐  │
//! │  │ 1. UPDATE pricing_tables SET active = 0                          │  │
//! │  │    WHERE variant = 'glass_holder' AND active = 1                 │  │
//! │  │ 2. INSERT pricing_tables (..., version = '2024-07', active = 1)  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← readers see either the old active table or the new one       │
//! │                                                                         │
//! │  Orders already placed keep the version string they were priced with. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use magholder_core::validation::{validate_pricing_table, validate_variant};
use magholder_core::{PriceMap, PricingTable};

const SELECT_COLUMNS: &str = r#"
    SELECT
        variant,
        version,
        active,
        base_price_cents,
        color_prices,
        finish_prices,
        arm_prices,
        module_prices,
        pattern_prices
    FROM pricing_tables
"#;

/// Row as stored. Option maps are JSON text.
#[derive(Debug, sqlx::FromRow)]
struct PricingTableRow {
    variant: String,
    version: String,
    active: bool,
    base_price_cents: i64,
    color_prices: String,
    finish_prices: String,
    arm_prices: String,
    module_prices: String,
    pattern_prices: String,
}

impl TryFrom<PricingTableRow> for PricingTable {
    type Error = DbError;

    fn try_from(row: PricingTableRow) -> DbResult<Self> {
        let mut table = PricingTable::new(
            row.variant,
            row.version,
            magholder_core::Money::from_cents(row.base_price_cents),
        );
        table.active = row.active;
        table.color_prices = serde_json::from_str(&row.color_prices)?;
        table.finish_prices = decode_prices(&row.finish_prices)?;
        table.arm_prices = decode_prices(&row.arm_prices)?;
        table.module_prices = decode_prices(&row.module_prices)?;
        table.pattern_prices = decode_prices(&row.pattern_prices)?;
        Ok(table)
    }
}

fn decode_prices(json: &str) -> DbResult<PriceMap> {
    Ok(serde_json::from_str(json)?)
}

/// Repository for pricing table operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.pricing_tables();
///
/// let table = repo.get_active("glass_holder").await?;
/// repo.publish(&new_version).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PricingTableRepository {
    pool: SqlitePool,
}

impl PricingTableRepository {
    /// Creates a new PricingTableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PricingTableRepository { pool }
    }

    /// Gets the active table for a variant.
    ///
    /// ## Returns
    /// * `Ok(Some(PricingTable))` - Active table
    /// * `Ok(None)` - Variant unknown, or retired with no active table
    pub async fn get_active(&self, variant: &str) -> DbResult<Option<PricingTable>> {
        debug!(variant = %variant, "Fetching active pricing table");

        let query = format!("{SELECT_COLUMNS} WHERE variant = ?1 AND active = 1");
        let row: Option<PricingTableRow> = sqlx::query_as(&query)
            .bind(variant)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PricingTable::try_from).transpose()
    }

    /// Gets a specific version of a variant's table, active or not.
    ///
    /// ## Usage
    /// Audit: look up the table an existing order was priced with.
    pub async fn get_version(&self, variant: &str, version: &str) -> DbResult<Option<PricingTable>> {
        let query = format!("{SELECT_COLUMNS} WHERE variant = ?1 AND version = ?2");
        let row: Option<PricingTableRow> = sqlx::query_as(&query)
            .bind(variant)
            .bind(version)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PricingTable::try_from).transpose()
    }

    /// Lists every version of a variant's table, newest first.
    pub async fn list_versions(&self, variant: &str) -> DbResult<Vec<PricingTable>> {
        let query =
            format!("{SELECT_COLUMNS} WHERE variant = ?1 ORDER BY created_at DESC, rowid DESC");
        let rows: Vec<PricingTableRow> = sqlx::query_as(&query)
            .bind(variant)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(PricingTable::try_from).collect()
    }

    /// Publishes a new version as the active table for its variant.
    ///
    /// The previous active table is deactivated in the same transaction.
    /// The `active` flag on the argument is ignored; the stored table is
    /// always active.
    ///
    /// ## Returns
    /// * `Ok(PricingTable)` - The stored table
    /// * `Err(DbError::Validation)` - Table failed validation
    /// * `Err(DbError::UniqueViolation)` - Version already exists; nothing changed
    pub async fn publish(&self, table: &PricingTable) -> DbResult<PricingTable> {
        validate_pricing_table(table)?;

        debug!(variant = %table.variant, version = %table.version, "Publishing pricing table");

        let color_prices = serde_json::to_string(&table.color_prices)?;
        let finish_prices = serde_json::to_string(&table.finish_prices)?;
        let arm_prices = serde_json::to_string(&table.arm_prices)?;
        let module_prices = serde_json::to_string(&table.module_prices)?;
        let pattern_prices = serde_json::to_string(&table.pattern_prices)?;

        let mut tx = self.pool.begin().await?;

        let deactivated = sqlx::query(
            "UPDATE pricing_tables SET active = 0 WHERE variant = ?1 AND active = 1",
        )
        .bind(&table.variant)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO pricing_tables (
                id, variant, version, active, base_price_cents,
                color_prices, finish_prices, arm_prices, module_prices, pattern_prices,
                created_at
            ) VALUES (
                ?1, ?2, ?3, 1, ?4,
                ?5, ?6, ?7, ?8, ?9,
                ?10
            )
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&table.variant)
        .bind(&table.version)
        .bind(table.base_price_cents.cents())
        .bind(color_prices)
        .bind(finish_prices)
        .bind(arm_prices)
        .bind(module_prices)
        .bind(pattern_prices)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &table.version),
            other => other,
        })?;

        tx.commit().await?;

        info!(
            variant = %table.variant,
            version = %table.version,
            replaced = deactivated.rows_affected(),
            "Pricing table published"
        );

        let mut published = table.clone();
        published.active = true;
        Ok(published)
    }

    /// Re-activates an existing version (rollback), deactivating whichever
    /// table is currently active for the variant.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Version doesn't exist; nothing changed
    pub async fn activate_version(&self, variant: &str, version: &str) -> DbResult<()> {
        validate_variant(variant)?;

        debug!(variant = %variant, version = %version, "Activating pricing table version");

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE pricing_tables SET active = 0 WHERE variant = ?1 AND active = 1")
            .bind(variant)
            .execute(&mut *tx)
            .await?;

        let result =
            sqlx::query("UPDATE pricing_tables SET active = 1 WHERE variant = ?1 AND version = ?2")
                .bind(variant)
                .bind(version)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the deactivation
            return Err(DbError::not_found(
                "Pricing table",
                format!("{variant}@{version}"),
            ));
        }

        tx.commit().await?;

        info!(variant = %variant, version = %version, "Pricing table version activated");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
