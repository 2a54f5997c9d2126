//! # Checkout
//!
//! Prices a customer's selection against the active table and appends it
//! to an order as a frozen line.
//!
//! ```text
//! add_item(order, selection, fee)
//!     │
//!     ├── PricingCache::active_table(variant)     NotFound if unpublished
//!     ├── price_order_line(selection, table, fee) quantity cap, pricing errors
//!     └── OrderRepository::insert_item(...)       pending orders only
//! ```
//!
//! Every failure happens before the single INSERT, so a failed call never
//! leaves a partial line behind.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::PricingCache;
use crate::error::DbResult;
use crate::repository::order::OrderRepository;
use magholder_core::{price_order_line, Money, OrderItem, Selection};

/// Checkout service tying the pricing cache to order persistence.
#[derive(Debug, Clone)]
pub struct Checkout {
    orders: OrderRepository,
    pricing: Arc<PricingCache>,
}

impl Checkout {
    pub fn new(orders: OrderRepository, pricing: Arc<PricingCache>) -> Self {
        Checkout { orders, pricing }
    }

    /// Prices and persists one order line.
    ///
    /// ## Returns
    /// * `Ok(OrderItem)` - The stored line, including its pricing version
    /// * `Err(DbError::Pricing)` - Unknown option, wrong variant, overflow
    /// * `Err(DbError::Validation)` - Quantity above the checkout cap
    /// * `Err(DbError::NotFound)` - No active table, or no such order
    pub async fn add_item(
        &self,
        order_id: &str,
        selection: &Selection,
        custom_fee: Money,
    ) -> DbResult<OrderItem> {
        let table = self.pricing.active_table(&selection.variant).await?;

        let breakdown = match price_order_line(selection, &table, custom_fee) {
            Ok(breakdown) => breakdown,
            Err(e) => {
                warn!(
                    order_id = %order_id,
                    variant = %selection.variant,
                    version = %table.version,
                    error = %e,
                    "Selection rejected at checkout"
                );
                return Err(e.into());
            }
        };

        let item = self.orders.insert_item(order_id, selection, &breakdown).await?;

        info!(
            order_id = %order_id,
            line_number = item.line_number,
            version = %breakdown.pricing_version,
            subtotal_cents = breakdown.subtotal_cents.cents(),
            "Order line priced"
        );

        Ok(item)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use magholder_core::{PricingError, PricingTable, ValidationError};
    use std::time::Duration;

    fn glass_holder(version: &str, base: i64) -> PricingTable {
        PricingTable::new("glass_holder", version, Money::from_cents(base))
            .with_color("base", "red", Money::from_cents(150))
            .with_color("base", "black", Money::zero())
            .with_finish("glossy", Money::from_cents(200))
    }

    async fn setup() -> (Database, Arc<PricingCache>, Checkout) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = Arc::new(PricingCache::new(db.pricing_tables(), Duration::from_secs(60)));
        let checkout = Checkout::new(db.orders(), Arc::clone(&cache));
        (db, cache, checkout)
    }

    fn red_glossy(quantity: i64) -> Selection {
        Selection::new("glass_holder")
            .with_color("base", "red")
            .with_finish("glossy")
            .with_quantity(quantity)
    }

    #[tokio::test]
    async fn test_add_item_records_price_and_version() {
        let (db, cache, checkout) = setup().await;
        cache.publish(&glass_holder("2024-06", 4990)).await.unwrap();
        let order = db.orders().create_order(None).await.unwrap();

        let item = checkout
            .add_item(&order.id, &red_glossy(2), Money::zero())
            .await
            .unwrap();

        assert_eq!(item.breakdown.unit_price_cents.cents(), 5340);
        assert_eq!(item.breakdown.subtotal_cents.cents(), 10680);
        assert_eq!(item.breakdown.pricing_version, "2024-06");
        assert_eq!(db.orders().order_total(&order.id).await.unwrap().cents(), 10680);
    }

    #[tokio::test]
    async fn test_republish_does_not_change_existing_items() {
        let (db, cache, checkout) = setup().await;
        cache.publish(&glass_holder("v1", 4990)).await.unwrap();
        let order = db.orders().create_order(None).await.unwrap();
        checkout.add_item(&order.id, &red_glossy(1), Money::zero()).await.unwrap();

        cache.publish(&glass_holder("v2", 5990)).await.unwrap();
        checkout.add_item(&order.id, &red_glossy(1), Money::zero()).await.unwrap();

        let items = db.orders().get_items(&order.id).await.unwrap();
        assert_eq!(items[0].breakdown.pricing_version, "v1");
        assert_eq!(items[0].subtotal().cents(), 5340);
        assert_eq!(items[1].breakdown.pricing_version, "v2");
        assert_eq!(items[1].subtotal().cents(), 6340);
    }

    #[tokio::test]
    async fn test_unknown_option_writes_nothing() {
        let (db, cache, checkout) = setup().await;
        cache.publish(&glass_holder("v1", 4990)).await.unwrap();
        let order = db.orders().create_order(None).await.unwrap();

        let selection = Selection::new("glass_holder").with_color("base", "chartreuse");
        let err = checkout
            .add_item(&order.id, &selection, Money::zero())
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Pricing(PricingError::UnknownOptionValue { .. })));
        assert!(db.orders().get_items(&order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quantity_cap_and_custom_fee() {
        let (db, cache, checkout) = setup().await;
        cache.publish(&glass_holder("v1", 4990)).await.unwrap();
        let order = db.orders().create_order(None).await.unwrap();

        let err = checkout
            .add_item(&order.id, &red_glossy(1000), Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(ValidationError::OutOfRange { .. })));

        let err = checkout
            .add_item(&order.id, &red_glossy(0), Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Pricing(PricingError::InvalidQuantity { quantity: 0 })));

        let item = checkout
            .add_item(&order.id, &red_glossy(3), Money::from_cents(500))
            .await
            .unwrap();
        assert_eq!(item.breakdown.custom_fee_cents.cents(), 500);
        assert_eq!(item.breakdown.unit_price_cents.cents(), 5840);
        assert_eq!(item.breakdown.subtotal_cents.cents(), 17520);
    }

    #[tokio::test]
    async fn test_unpublished_variant_and_closed_order() {
        let (db, cache, checkout) = setup().await;
        let order = db.orders().create_order(None).await.unwrap();

        let err = checkout
            .add_item(&order.id, &red_glossy(1), Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        cache.publish(&glass_holder("v1", 4990)).await.unwrap();
        db.orders().cancel(&order.id).await.unwrap();

        let err = checkout
            .add_item(&order.id, &red_glossy(1), Money::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidOrderStatus { .. }));
    }
}
