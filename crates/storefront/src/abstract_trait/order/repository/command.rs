use crate::model::order::{Order as OrderModel, OrderStatus};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    /// Moves the order to `next` only while it is still in `current`.
    /// Returns `None` when the row is missing or was changed concurrently.
    async fn update_status(
        &self,
        id: i32,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<OrderModel>, RepositoryError>;
}
