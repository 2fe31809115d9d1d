//! Stock reservations against the product rows of an open unit of work.
//!
//! A reservation reads the product's stock and version, then decrements with
//! a compare-and-swap on that version. A lost swap is retried with
//! exponential backoff and jitter until the attempt budget runs out, at
//! which point the caller gets [`ServiceError::Conflict`].
//!
//! A lock wait that times out in the store already spent the configured lock
//! timeout, so it surfaces as `Conflict` at once and is not retried here.

use crate::{abstract_trait::unit_of_work::StockStoreTrait, model::product::Product as ProductModel};
use prometheus_client::{metrics::counter::Counter, registry::Registry};
use rand::Rng;
use rust_decimal::Decimal;
use shared::errors::ServiceError;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct ReservePolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for ReservePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
        }
    }
}

/// A stock decrement applied inside the current unit of work, with the
/// product's name and price at the version it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub product_id: i32,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub remaining: i32,
}

#[derive(Debug, Clone, Default)]
pub struct LedgerMetrics {
    pub retries: Counter,
    pub releases: Counter,
}

#[derive(Debug, Clone)]
pub struct InventoryLedger {
    policy: ReservePolicy,
    metrics: LedgerMetrics,
}

impl InventoryLedger {
    pub fn new(policy: ReservePolicy, registry: &mut Registry) -> Self {
        let metrics = LedgerMetrics::default();

        registry.register(
            "inventory_reservation_retries",
            "Reservations retried after losing the stock version check",
            metrics.retries.clone(),
        );
        registry.register(
            "inventory_compensating_releases",
            "Reservations released to compensate a failed checkout",
            metrics.releases.clone(),
        );

        Self { policy, metrics }
    }

    pub fn metrics(&self) -> &LedgerMetrics {
        &self.metrics
    }

    pub async fn try_reserve<S>(
        &self,
        store: &mut S,
        product_id: i32,
        quantity: i32,
    ) -> Result<Reservation, ServiceError>
    where
        S: StockStoreTrait + Send + ?Sized,
    {
        if quantity < 1 {
            return Err(ServiceError::validation("Quantity must be at least 1"));
        }

        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let product = store
                .read_stock(product_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Product {product_id} not found")))?;

            if product.stock < quantity {
                return Err(ServiceError::insufficient(
                    product_id,
                    product.name,
                    quantity,
                    product.stock,
                ));
            }

            if let Some(updated) = store
                .compare_and_decrement(product_id, quantity, product.version)
                .await?
            {
                info!(
                    "✅ Reserved {quantity} of product {product_id}, {} left",
                    updated.stock
                );
                return Ok(Reservation {
                    product_id,
                    product_name: updated.name,
                    unit_price: updated.price,
                    quantity,
                    remaining: updated.stock,
                });
            }

            if attempt < max_attempts {
                self.metrics.retries.inc();
                let delay = self.backoff(attempt);
                warn!(
                    "⚠️ Lost stock update race on product {product_id} (attempt {attempt}/{max_attempts}), retrying in {delay:?}"
                );
                tokio::time::sleep(delay).await;
            }
        }

        warn!("⚠️ Giving up on product {product_id} after {max_attempts} attempts");
        Err(ServiceError::Conflict(format!(
            "Stock of product {product_id} kept changing, try again"
        )))
    }

    /// Puts back stock taken by [`InventoryLedger::try_reserve`].
    pub async fn release<S>(
        &self,
        store: &mut S,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductModel, ServiceError>
    where
        S: StockStoreTrait + Send + ?Sized,
    {
        if quantity < 1 {
            return Err(ServiceError::validation("Quantity must be at least 1"));
        }

        let product = store.increment_stock(product_id, quantity).await?;
        self.metrics.releases.inc();
        info!("🔄 Released {quantity} of product {product_id}, now {}", product.stock);

        Ok(product)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.policy.base_delay;
        let exponential = base.saturating_mul(1 << (attempt - 1).min(16));
        let jitter_ms = rand::rng().random_range(0..=base.as_millis() as u64);

        exponential + Duration::from_millis(jitter_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_trait::unit_of_work::MockStockStoreTrait;
    use chrono::Utc;
    use mockall::{Sequence, predicate::eq};
    use rust_decimal_macros::dec;
    use shared::errors::RepositoryError;

    fn product(stock: i32, version: i32) -> ProductModel {
        let now = Utc::now().naive_utc();
        ProductModel {
            product_id: 7,
            category_id: 1,
            name: "Widget".into(),
            description: None,
            price: dec!(10.00),
            stock,
            image_url: None,
            version,
            created_at: now,
            updated_at: now,
        }
    }

    fn ledger(max_attempts: u32) -> InventoryLedger {
        let policy = ReservePolicy {
            max_attempts,
            base_delay: Duration::ZERO,
        };
        InventoryLedger::new(policy, &mut Registry::default())
    }

    #[tokio::test]
    async fn reserves_on_first_attempt() {
        let mut store = MockStockStoreTrait::new();
        store
            .expect_read_stock()
            .with(eq(7))
            .times(1)
            .returning(|_| Ok(Some(product(5, 3))));
        store
            .expect_compare_and_decrement()
            .with(eq(7), eq(3), eq(3))
            .times(1)
            .returning(|_, qty, _| Ok(Some(product(5 - qty, 4))));

        let reservation = ledger(5).try_reserve(&mut store, 7, 3).await.unwrap();

        assert_eq!(
            reservation,
            Reservation {
                product_id: 7,
                product_name: "Widget".into(),
                unit_price: dec!(10.00),
                quantity: 3,
                remaining: 2
            }
        );
    }

    #[tokio::test]
    async fn retries_after_a_lost_swap() {
        let mut seq = Sequence::new();
        let mut store = MockStockStoreTrait::new();
        store
            .expect_read_stock()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(product(5, 1))));
        store
            .expect_compare_and_decrement()
            .with(eq(7), eq(2), eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(None));
        store
            .expect_read_stock()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(product(4, 2))));
        store
            .expect_compare_and_decrement()
            .with(eq(7), eq(2), eq(2))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(Some(product(2, 3))));

        let ledger = ledger(5);
        let reservation = ledger.try_reserve(&mut store, 7, 2).await.unwrap();

        assert_eq!(reservation.remaining, 2);
        assert_eq!(ledger.metrics().retries.get(), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_conflict() {
        let mut store = MockStockStoreTrait::new();
        store
            .expect_read_stock()
            .times(3)
            .returning(|_| Ok(Some(product(5, 1))));
        store
            .expect_compare_and_decrement()
            .times(3)
            .returning(|_, _, _| Ok(None));

        let ledger = ledger(3);
        let result = ledger.try_reserve(&mut store, 7, 1).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert_eq!(ledger.metrics().retries.get(), 2);
    }

    #[tokio::test]
    async fn short_stock_fails_without_writing() {
        let mut store = MockStockStoreTrait::new();
        store
            .expect_read_stock()
            .returning(|_| Ok(Some(product(2, 1))));
        store.expect_compare_and_decrement().never();

        let result = ledger(5).try_reserve(&mut store, 7, 3).await;

        match result {
            Err(ServiceError::InsufficientStock(lines)) => {
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].product_name, "Widget");
                assert_eq!(lines[0].requested, 3);
                assert_eq!(lines[0].available, 2);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let mut store = MockStockStoreTrait::new();
        store.expect_read_stock().returning(|_| Ok(None));

        let result = ledger(5).try_reserve(&mut store, 7, 1).await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected_before_reading() {
        let mut store = MockStockStoreTrait::new();
        store.expect_read_stock().never();
        store.expect_increment_stock().never();

        let ledger = ledger(5);

        assert!(matches!(
            ledger.try_reserve(&mut store, 7, 0).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            ledger.release(&mut store, 7, -1).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn storage_failures_are_not_retried() {
        let mut store = MockStockStoreTrait::new();
        store
            .expect_read_stock()
            .times(1)
            .returning(|_| Err(RepositoryError::NotFound));

        let result = ledger(5).try_reserve(&mut store, 7, 1).await;

        assert!(matches!(result, Err(ServiceError::Repo(RepositoryError::NotFound))));
    }

    #[tokio::test]
    async fn lock_timeouts_surface_without_retry() {
        let mut store = MockStockStoreTrait::new();
        store
            .expect_read_stock()
            .times(1)
            .returning(|_| Err(RepositoryError::Conflict("lock wait timed out".into())));
        store.expect_compare_and_decrement().never();

        let ledger = ledger(5);
        let result = ledger.try_reserve(&mut store, 7, 1).await;

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert_eq!(ledger.metrics().retries.get(), 0);
    }

    #[tokio::test]
    async fn release_increments_and_counts() {
        let mut store = MockStockStoreTrait::new();
        store
            .expect_increment_stock()
            .with(eq(7), eq(3))
            .times(1)
            .returning(|_, qty| Ok(product(2 + qty, 5)));

        let ledger = ledger(5);
        let product = ledger.release(&mut store, 7, 3).await.unwrap();

        assert_eq!(product.stock, 5);
        assert_eq!(ledger.metrics().releases.get(), 1);
    }
}
