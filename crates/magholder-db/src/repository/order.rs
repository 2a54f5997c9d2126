//! # Order Repository
//!
//! Database operations for orders and their priced line items.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     └── create_order() → Order { status: Pending }                     │
//! │                                                                         │
//! │  2. ADD PRICED ITEMS (pending only)                                    │
//! │     └── insert_item(selection, breakdown) → OrderItem                  │
//! │         breakdown is frozen: UPDATE on order_items aborts               │
//! │                                                                         │
//! │  3. PAY                                                                │
//! │     └── mark_paid() → Order { status: Paid }                           │
//! │                                                                         │
//! │  4. (OPTIONAL) CANCEL                                                  │
//! │     └── cancel() → Order { status: Cancelled }                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is exactly one order table. Anything that needs an order reads it
//! from here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use magholder_core::{Money, Order, OrderItem, OrderStatus, PriceBreakdown, Selection};

/// Item row as stored. `selection` and `breakdown` are JSON text; the
/// price columns duplicate the breakdown for reporting queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    line_number: i64,
    quantity: i64,
    selection: String,
    breakdown: String,
    unit_price_cents: i64,
    subtotal_cents: i64,
    created_at: chrono::DateTime<Utc>,
}

impl OrderItemRow {
    /// Whether the denormalized columns still agree with the JSON breakdown.
    fn columns_match(&self, breakdown: &PriceBreakdown) -> bool {
        breakdown.unit_price_cents.cents() == self.unit_price_cents
            && breakdown.subtotal_cents.cents() == self.subtotal_cents
    }
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = DbError;

    fn try_from(row: OrderItemRow) -> DbResult<Self> {
        Ok(OrderItem {
            id: row.id,
            order_id: row.order_id,
            line_number: row.line_number,
            selection: serde_json::from_str(&row.selection)?,
            breakdown: serde_json::from_str(&row.breakdown)?,
            created_at: row.created_at,
        })
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates a new pending order.
    ///
    /// The order number is `MH-YYYYMMDD-NNNN`, NNNN counting the day's
    /// orders. It is assigned inside the INSERT so concurrent creates
    /// cannot collide.
    pub async fn create_order(&self, customer_email: Option<&str>) -> DbResult<Order> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let prefix = format!("MH-{}-", now.format("%Y%m%d"));
        let customer_email = customer_email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string);

        let order_number: String = sqlx::query_scalar(
            r#"
            INSERT INTO orders (id, order_number, status, customer_email, created_at, updated_at)
            VALUES (
                ?1,
                ?2 || printf('%04d', (SELECT COUNT(*) + 1 FROM orders WHERE order_number LIKE ?2 || '%')),
                'pending',
                ?3,
                ?4,
                ?4
            )
            RETURNING order_number
            "#,
        )
        .bind(&id)
        .bind(&prefix)
        .bind(&customer_email)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(id = %id, order_number = %order_number, "Order created");

        Ok(Order {
            id,
            order_number,
            status: OrderStatus::Pending,
            customer_email,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets an order by ID.
    pub async fn get_order(&self, id: &str) -> DbResult<Option<Order>> {
        let order: Option<Order> = sqlx::query_as(
            r#"
            SELECT id, order_number, status, customer_email, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Appends a priced line to a pending order.
    ///
    /// ## Snapshot Pattern
    /// The selection and its breakdown are stored verbatim, together with
    /// the pricing version. They are never recomputed.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    /// * `Err(DbError::InvalidOrderStatus)` - Order is not pending
    /// * `Err(DbError::InconsistentBreakdown)` - Breakdown parts don't add up
    pub async fn insert_item(
        &self,
        order_id: &str,
        selection: &Selection,
        breakdown: &PriceBreakdown,
    ) -> DbResult<OrderItem> {
        if !breakdown.is_consistent(selection.quantity) {
            return Err(DbError::InconsistentBreakdown(format!(
                "unit {} × {} ≠ subtotal {}",
                breakdown.unit_price_cents, selection.quantity, breakdown.subtotal_cents
            )));
        }

        debug!(order_id = %order_id, variant = %selection.variant, "Adding order item");

        let selection_json = serde_json::to_string(selection)?;
        let breakdown_json = serde_json::to_string(breakdown)?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let status: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;

        match status {
            None => return Err(DbError::not_found("Order", order_id)),
            Some(OrderStatus::Pending) => {}
            Some(other) => {
                return Err(DbError::InvalidOrderStatus {
                    order_id: order_id.to_string(),
                    status: other.as_str().to_string(),
                })
            }
        }

        let line_number: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO order_items (
                id, order_id, line_number, variant, quantity,
                selection, breakdown, pricing_version,
                unit_price_cents, subtotal_cents, created_at
            ) VALUES (
                ?1, ?2,
                (SELECT COALESCE(MAX(line_number), 0) + 1 FROM order_items WHERE order_id = ?2),
                ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10
            )
            RETURNING line_number
            "#,
        )
        .bind(&id)
        .bind(order_id)
        .bind(&selection.variant)
        .bind(selection.quantity)
        .bind(selection_json)
        .bind(breakdown_json)
        .bind(&breakdown.pricing_version)
        .bind(breakdown.unit_price_cents.cents())
        .bind(breakdown.subtotal_cents.cents())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE orders SET updated_at = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(OrderItem {
            id,
            order_id: order_id.to_string(),
            line_number,
            selection: selection.clone(),
            breakdown: breakdown.clone(),
            created_at: now,
        })
    }

    /// Gets all items for an order in line order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        self.fetch_item_rows(order_id)
            .await?
            .into_iter()
            .map(OrderItem::try_from)
            .collect()
    }

    /// Sum of the order's item subtotals.
    pub async fn order_total(&self, order_id: &str) -> DbResult<Money> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(subtotal_cents) FROM order_items WHERE order_id = ?1",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(total.unwrap_or(0)))
    }

    /// Marks a pending order as paid.
    pub async fn mark_paid(&self, order_id: &str) -> DbResult<()> {
        self.transition(order_id, "status = 'pending'", OrderStatus::Paid)
            .await
    }

    /// Cancels a pending or paid order.
    pub async fn cancel(&self, order_id: &str) -> DbResult<()> {
        self.transition(order_id, "status IN ('pending', 'paid')", OrderStatus::Cancelled)
            .await
    }

    /// Returns ids of stored items that no longer add up.
    ///
    /// ## What Is Checked
    /// - base + options + custom fee == unit, unit × quantity == subtotal
    /// - the unit/subtotal columns match the stored breakdown
    pub async fn audit_items(&self, order_id: &str) -> DbResult<Vec<String>> {
        let mut mismatched = Vec::new();

        for row in self.fetch_item_rows(order_id).await? {
            let breakdown: PriceBreakdown = serde_json::from_str(&row.breakdown)?;
            if !breakdown.is_consistent(row.quantity) || !row.columns_match(&breakdown) {
                warn!(order_id = %order_id, item_id = %row.id, "Stored breakdown is inconsistent");
                mismatched.push(row.id);
            }
        }

        Ok(mismatched)
    }

    async fn fetch_item_rows(&self, order_id: &str) -> DbResult<Vec<OrderItemRow>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                order_id,
                line_number,
                quantity,
                selection,
                breakdown,
                unit_price_cents,
                subtotal_cents,
                created_at
            FROM order_items
            WHERE order_id = ?1
            ORDER BY line_number
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn transition(&self, order_id: &str, allowed: &str, to: OrderStatus) -> DbResult<()> {
        let query = format!("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 AND {allowed}");

        let result = sqlx::query(&query)
            .bind(order_id)
            .bind(to)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return match self.get_order(order_id).await? {
                None => Err(DbError::not_found("Order", order_id)),
                Some(order) => Err(DbError::InvalidOrderStatus {
                    order_id: order_id.to_string(),
                    status: order.status.as_str().to_string(),
                }),
            };
        }

        info!(order_id = %order_id, status = to.as_str(), "Order status changed");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
