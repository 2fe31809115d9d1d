use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use sqlx::FromRow;

/// Largest amount a `NUMERIC(18, 2)` column holds: 9999999999999999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA763_FFFF, 0x0DE0_B6B3, 0, false, 2);

pub fn amount_too_large() -> ServiceError {
    ServiceError::validation(format!("Amount exceeds the maximum of {MAX_AMOUNT}"))
}

/// `unit_price × quantity`, or `None` past [`MAX_AMOUNT`].
pub fn line_amount(unit_price: Decimal, quantity: i32) -> Option<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))
        .filter(|amount| *amount <= MAX_AMOUNT)
}

/// Sum of `amounts`, or `None` past [`MAX_AMOUNT`].
pub fn sum_amounts(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |total, amount| {
        total
            .checked_add(amount)
            .filter(|total| *total <= MAX_AMOUNT)
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cart {
    pub cart_id: i32,
    pub user_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub cart_item_id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
}

/// A cart line read together with its product's current name, price and stock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartLine {
    pub cart_item_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub product_name: String,
    pub unit_price: Decimal,
    pub stock: i32,
}

impl CartLine {
    pub fn subtotal(&self) -> Result<Decimal, ServiceError> {
        line_amount(self.unit_price, self.quantity).ok_or_else(amount_too_large)
    }
}

/// Total of every line at current prices.
pub fn cart_total(lines: &[CartLine]) -> Result<Decimal, ServiceError> {
    let subtotals = lines
        .iter()
        .map(CartLine::subtotal)
        .collect::<Result<Vec<_>, _>>()?;

    sum_amounts(subtotals).ok_or_else(amount_too_large)
}
