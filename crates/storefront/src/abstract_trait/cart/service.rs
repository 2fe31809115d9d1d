use crate::domain::{
    requests::cart::{AddCartItemRequest, UpdateCartItemRequest},
    response::cart::CartResponse,
};
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynCartService = Arc<dyn CartServiceTrait + Send + Sync>;

#[async_trait]
pub trait CartServiceTrait {
    async fn get_cart(&self, user_id: &str) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn get_or_create_cart(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn add_item(
        &self,
        user_id: &str,
        req: &AddCartItemRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn update_item(
        &self,
        user_id: &str,
        product_id: i32,
        req: &UpdateCartItemRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn remove_item(
        &self,
        user_id: &str,
        product_id: i32,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn clear_cart(&self, user_id: &str) -> Result<ApiResponse<()>, ServiceError>;
}
