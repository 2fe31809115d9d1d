use crate::model::cart::{CartLine, amount_too_large, sum_amounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct CartItemResponse {
    pub product_id: i32,
    pub product_name: String,
    #[schema(value_type = String, example = "24.99")]
    pub price: Decimal,
    pub quantity: i32,
    #[schema(value_type = String, example = "49.98")]
    pub subtotal: Decimal,
}

impl TryFrom<&CartLine> for CartItemResponse {
    type Error = ServiceError;

    fn try_from(line: &CartLine) -> Result<Self, Self::Error> {
        Ok(CartItemResponse {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            price: line.unit_price,
            quantity: line.quantity,
            subtotal: line.subtotal()?,
        })
    }
}

/// Cart as shown to its owner. A user without a cart gets an empty view
/// with no `id`.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct CartResponse {
    pub id: Option<i32>,
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    #[schema(value_type = String, example = "49.98")]
    pub total_amount: Decimal,
}

impl CartResponse {
    pub fn empty(user_id: &str) -> Self {
        CartResponse {
            id: None,
            user_id: user_id.to_string(),
            items: Vec::new(),
            total_amount: Decimal::ZERO,
        }
    }

    /// Fails with a validation error when a subtotal or the total does not
    /// fit the amount columns.
    pub fn from_lines(
        cart_id: i32,
        user_id: &str,
        lines: &[CartLine],
    ) -> Result<Self, ServiceError> {
        let items = lines
            .iter()
            .map(CartItemResponse::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let total_amount =
            sum_amounts(items.iter().map(|item| item.subtotal)).ok_or_else(amount_too_large)?;

        Ok(CartResponse {
            id: Some(cart_id),
            user_id: user_id.to_string(),
            items,
            total_amount,
        })
    }
}
