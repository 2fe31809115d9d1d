//! Cart-to-order conversion.
//!
//! One checkout runs inside a single unit of work: lock the cart, validate
//! every line against current stock and the amount limit, reserve stock line
//! by line in ascending product id order, create the `Pending` order with item
//! snapshots taken from the reserved product rows, clear the cart, commit.
//! Any failure rolls the whole unit back after releasing the reservations
//! already applied.

use super::{
    inventory::{InventoryLedger, Reservation},
    settle,
};
use crate::{
    abstract_trait::{
        checkout::CheckoutServiceTrait,
        unit_of_work::{DynUnitOfWorkFactory, UnitOfWorkTrait},
    },
    domain::{
        requests::order::{
            CreateOrderItemRecordRequest, CreateOrderRecordRequest, CreateOrderRequest,
            SHIPPING_ADDRESS_MAX, SHIPPING_ADDRESS_MIN,
        },
        response::order::OrderResponse,
    },
    model::{
        cart::{CartLine, amount_too_large, cart_total, line_amount, sum_amounts},
        order::OrderStatus,
    },
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::{
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};
use rust_decimal::Decimal;
use shared::{
    domain::responses::ApiResponse,
    errors::{InsufficientStockLine, ServiceError},
    utils::{Method, ServiceTracer},
};
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum CheckoutOutcome {
    Success,
    CartEmpty,
    InsufficientStock,
    Conflict,
    Error,
}

impl CheckoutOutcome {
    fn of<T>(result: &Result<T, ServiceError>) -> Self {
        match result {
            Ok(_) => CheckoutOutcome::Success,
            Err(ServiceError::CartEmpty) => CheckoutOutcome::CartEmpty,
            Err(ServiceError::InsufficientStock(_)) => CheckoutOutcome::InsufficientStock,
            Err(ServiceError::Conflict(_)) => CheckoutOutcome::Conflict,
            Err(_) => CheckoutOutcome::Error,
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct CheckoutLabels {
    pub outcome: CheckoutOutcome,
}

/// Trims the address and checks its length in characters.
pub fn normalize_shipping_address(raw: &str) -> Result<String, ServiceError> {
    let address = raw.trim();
    let length = address.chars().count();

    if !(SHIPPING_ADDRESS_MIN..=SHIPPING_ADDRESS_MAX).contains(&length) {
        return Err(ServiceError::validation(format!(
            "Shipping address must be between {SHIPPING_ADDRESS_MIN} and {SHIPPING_ADDRESS_MAX} characters"
        )));
    }

    Ok(address.to_string())
}

fn shortages(lines: &[CartLine]) -> Vec<InsufficientStockLine> {
    lines
        .iter()
        .filter(|line| line.quantity > line.stock)
        .map(|line| InsufficientStockLine {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            requested: line.quantity,
            available: line.stock,
        })
        .collect()
}

/// Order total at the prices of the reserved product rows.
fn reserved_total(reservations: &[Reservation]) -> Result<Decimal, ServiceError> {
    let subtotals = reservations
        .iter()
        .map(|reservation| line_amount(reservation.unit_price, reservation.quantity))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(amount_too_large)?;

    sum_amounts(subtotals).ok_or_else(amount_too_large)
}

#[derive(Clone)]
pub struct CheckoutService {
    uow: DynUnitOfWorkFactory,
    ledger: InventoryLedger,
    outcomes: Family<CheckoutLabels, Counter>,
    tracer: ServiceTracer,
}

pub struct CheckoutServiceDeps {
    pub uow: DynUnitOfWorkFactory,
    pub ledger: InventoryLedger,
}

impl CheckoutService {
    pub fn new(deps: CheckoutServiceDeps, registry: &mut Registry) -> Self {
        let CheckoutServiceDeps { uow, ledger } = deps;

        let outcomes = Family::<CheckoutLabels, Counter>::default();
        registry.register(
            "checkout_outcomes",
            "Checkout attempts by outcome",
            outcomes.clone(),
        );

        Self {
            uow,
            ledger,
            outcomes,
            tracer: ServiceTracer::new("checkout-service", registry),
        }
    }

    pub fn outcomes(&self) -> &Family<CheckoutLabels, Counter> {
        &self.outcomes
    }

    async fn convert_cart(
        &self,
        uow: &mut dyn UnitOfWorkTrait,
        user_id: &str,
        shipping_address: String,
    ) -> Result<OrderResponse, ServiceError> {
        let cart = uow
            .lock_cart(user_id)
            .await?
            .ok_or(ServiceError::CartEmpty)?;
        let lines = uow.cart_lines(cart.cart_id).await?;
        if lines.is_empty() {
            return Err(ServiceError::CartEmpty);
        }

        let short = shortages(&lines);
        if !short.is_empty() {
            warn!(
                "⚠️ Checkout of cart {} rejected, {} line(s) short on stock",
                cart.cart_id,
                short.len()
            );
            return Err(ServiceError::InsufficientStock(short));
        }

        cart_total(&lines)?;

        let reservations = self.reserve_all(uow, &lines).await?;
        let total_amount = match reserved_total(&reservations) {
            Ok(total) => total,
            Err(err) => {
                self.release_all(uow, &reservations).await;
                return Err(err);
            }
        };

        let order = uow
            .insert_order(&CreateOrderRecordRequest {
                user_id: user_id.to_string(),
                total_amount,
                shipping_address,
                status: OrderStatus::Pending,
            })
            .await?;

        let mut items = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let item = uow
                .insert_order_item(&CreateOrderItemRecordRequest {
                    order_id: order.order_id,
                    product_id: reservation.product_id,
                    product_name: reservation.product_name,
                    quantity: reservation.quantity,
                    unit_price: reservation.unit_price,
                })
                .await?;
            items.push(item);
        }

        uow.clear_cart(cart.cart_id).await?;

        Ok(OrderResponse::from_parts(order, items))
    }

    /// Reserves every line, lowest product id first. On failure the
    /// reservations made so far are released before the error is returned.
    async fn reserve_all(
        &self,
        uow: &mut dyn UnitOfWorkTrait,
        lines: &[CartLine],
    ) -> Result<Vec<Reservation>, ServiceError> {
        let mut ordered: Vec<&CartLine> = lines.iter().collect();
        ordered.sort_by_key(|line| line.product_id);

        let mut applied: Vec<Reservation> = Vec::with_capacity(ordered.len());
        for line in ordered {
            match self
                .ledger
                .try_reserve(&mut *uow, line.product_id, line.quantity)
                .await
            {
                Ok(reservation) => applied.push(reservation),
                Err(err) => {
                    warn!(
                        "⚠️ Reservation of product {} failed, releasing {} earlier reservation(s): {err}",
                        line.product_id,
                        applied.len()
                    );
                    self.release_all(uow, &applied).await;
                    return Err(err);
                }
            }
        }

        Ok(applied)
    }

    async fn release_all(&self, uow: &mut dyn UnitOfWorkTrait, applied: &[Reservation]) {
        for reservation in applied.iter().rev() {
            if let Err(err) = self
                .ledger
                .release(&mut *uow, reservation.product_id, reservation.quantity)
                .await
            {
                error!(
                    "❌ Failed to release {} of product {}: {err}",
                    reservation.quantity, reservation.product_id
                );
            }
        }
    }
}

#[async_trait]
impl CheckoutServiceTrait for CheckoutService {
    async fn place_order(
        &self,
        user_id: &str,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🏗️ Placing order for user {user_id}");

        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "place_order",
            vec![
                KeyValue::new("component", "checkout"),
                KeyValue::new("order.user_id", user_id.to_string()),
            ],
        );

        let result = async {
            let shipping_address = normalize_shipping_address(&req.shipping_address)?;

            let mut uow = self.uow.begin().await?;
            let outcome = self
                .convert_cart(&mut *uow, user_id, shipping_address)
                .await;
            settle(uow, outcome).await
        }
        .await;

        let outcome = CheckoutOutcome::of(&result);
        self.outcomes
            .get_or_create(&CheckoutLabels { outcome })
            .inc();

        match result {
            Ok(order) => {
                self.tracer.complete_success(
                    &tracing_ctx,
                    method,
                    &format!("Order {} placed", order.id),
                );
                Ok(ApiResponse {
                    status: "success".into(),
                    message: "Order placed successfully".into(),
                    data: order,
                })
            }
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, &err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cart::MAX_AMOUNT;
    use rust_decimal_macros::dec;

    fn line(product_id: i32, quantity: i32, stock: i32) -> CartLine {
        CartLine {
            cart_item_id: product_id,
            product_id,
            quantity,
            product_name: format!("Product {product_id}"),
            unit_price: dec!(10.00),
            stock,
        }
    }

    #[test]
    fn address_is_trimmed_and_bounded() {
        assert_eq!(
            normalize_shipping_address("  12 Long Street, Springfield  ").unwrap(),
            "12 Long Street, Springfield"
        );
        assert!(normalize_shipping_address("   short   ").is_err());
        assert!(normalize_shipping_address(&"x".repeat(501)).is_err());
        assert!(normalize_shipping_address(&"x".repeat(500)).is_ok());
    }

    #[test]
    fn every_short_line_is_reported() {
        let lines = [line(1, 3, 5), line(2, 4, 1), line(3, 2, 0)];

        let short = shortages(&lines);

        assert_eq!(short.len(), 2);
        assert_eq!(short[0].product_id, 2);
        assert_eq!(short[0].available, 1);
        assert_eq!(short[1].product_id, 3);
        assert_eq!(short[1].requested, 2);
    }

    #[test]
    fn reserved_total_stays_within_the_amount_column() {
        let reserved = |unit_price, quantity| Reservation {
            product_id: 1,
            product_name: "Comb".into(),
            unit_price,
            quantity,
            remaining: 0,
        };

        assert_eq!(
            reserved_total(&[reserved(dec!(24.99), 2), reserved(dec!(10.00), 1)]).unwrap(),
            dec!(59.98)
        );
        assert!(matches!(
            reserved_total(&[reserved(MAX_AMOUNT, 1), reserved(dec!(0.01), 1)]),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            reserved_total(&[reserved(MAX_AMOUNT, i32::MAX)]),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn outcome_follows_error_kind() {
        let ok: Result<(), ServiceError> = Ok(());
        assert_eq!(CheckoutOutcome::of(&ok), CheckoutOutcome::Success);
        assert_eq!(
            CheckoutOutcome::of::<()>(&Err(ServiceError::CartEmpty)),
            CheckoutOutcome::CartEmpty
        );
        assert_eq!(
            CheckoutOutcome::of::<()>(&Err(ServiceError::Conflict("busy".into()))),
            CheckoutOutcome::Conflict
        );
        assert_eq!(
            CheckoutOutcome::of::<()>(&Err(ServiceError::validation("bad"))),
            CheckoutOutcome::Error
        );
    }
}
