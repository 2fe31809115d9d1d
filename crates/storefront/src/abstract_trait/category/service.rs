use crate::domain::{
    requests::category::{CreateCategoryRequest, UpdateCategoryRequest},
    response::category::CategoryResponse,
};
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynCategoryService = Arc<dyn CategoryServiceTrait + Send + Sync>;

#[async_trait]
pub trait CategoryServiceTrait {
    async fn find_all(&self) -> Result<ApiResponse<Vec<CategoryResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<CategoryResponse>, ServiceError>;
    async fn create_category(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<ApiResponse<CategoryResponse>, ServiceError>;
    async fn update_category(
        &self,
        req: &UpdateCategoryRequest,
    ) -> Result<ApiResponse<CategoryResponse>, ServiceError>;
    async fn delete_category(&self, id: i32) -> Result<ApiResponse<()>, ServiceError>;
}
