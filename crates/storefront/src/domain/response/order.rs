use crate::model::order::{Order as OrderModel, OrderItem as OrderItemModel, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct OrderItemResponse {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "24.99")]
    pub unit_price: Decimal,
    #[schema(value_type = String, example = "49.98")]
    pub subtotal: Decimal,
}

impl From<OrderItemModel> for OrderItemResponse {
    fn from(value: OrderItemModel) -> Self {
        OrderItemResponse {
            product_id: value.product_id,
            product_name: value.product_name,
            quantity: value.quantity,
            unit_price: value.unit_price,
            subtotal: value.unit_price * Decimal::from(value.quantity),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct OrderResponse {
    pub id: i32,
    pub user_id: String,
    pub order_date: String,
    #[schema(value_type = String, example = "74.97")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub updated_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    pub fn from_parts(order: OrderModel, items: Vec<OrderItemModel>) -> Self {
        OrderResponse {
            id: order.order_id,
            user_id: order.user_id,
            order_date: order.created_at.to_string(),
            total_amount: order.total_amount,
            status: order.status,
            shipping_address: order.shipping_address,
            updated_at: order.updated_at.to_string(),
            items: items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}
