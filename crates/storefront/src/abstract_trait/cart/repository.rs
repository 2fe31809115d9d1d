use crate::model::cart::{Cart as CartModel, CartLine};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynCartQueryRepository = Arc<dyn CartQueryRepositoryTrait + Send + Sync>;

/// Lock-free reads of committed cart state. Mutations go through a
/// unit of work so they serialize with checkout on the cart row.
#[async_trait]
pub trait CartQueryRepositoryTrait {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<CartModel>, RepositoryError>;
    async fn find_lines(&self, cart_id: i32) -> Result<Vec<CartLine>, RepositoryError>;
}
