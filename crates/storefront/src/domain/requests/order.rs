use crate::model::order::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const SHIPPING_ADDRESS_MIN: usize = 10;
pub const SHIPPING_ADDRESS_MAX: usize = 500;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema, Clone)]
pub struct CreateOrderRequest {
    #[validate(length(min = 10, max = 500))]
    pub shipping_address: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema, Clone)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, max = 50))]
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct CreateOrderRecordRequest {
    pub user_id: String,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct CreateOrderItemRecordRequest {
    pub order_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}
