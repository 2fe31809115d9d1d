use crate::domain::{requests::order::UpdateOrderStatusRequest, response::order::OrderResponse};
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn update_status(
        &self,
        requester: &str,
        id: i32,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
