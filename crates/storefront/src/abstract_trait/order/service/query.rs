use crate::domain::response::order::OrderResponse;
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_by_id(
        &self,
        requester: &str,
        id: i32,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn find_by_user(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError>;
}
