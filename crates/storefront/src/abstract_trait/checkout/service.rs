use crate::domain::{requests::order::CreateOrderRequest, response::order::OrderResponse};
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynCheckoutService = Arc<dyn CheckoutServiceTrait + Send + Sync>;

#[async_trait]
pub trait CheckoutServiceTrait {
    /// Converts the user's cart into a `Pending` order in one unit of work.
    async fn place_order(
        &self,
        user_id: &str,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
