use crate::model::order::{Order as OrderModel, OrderItem as OrderItemModel};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_by_id(&self, id: i32) -> Result<Option<OrderModel>, RepositoryError>;
    /// Newest first.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<OrderModel>, RepositoryError>;
    async fn find_items(&self, order_ids: &[i32]) -> Result<Vec<OrderItemModel>, RepositoryError>;
}
