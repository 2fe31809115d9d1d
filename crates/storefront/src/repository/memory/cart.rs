use super::store::MemoryDatabase;
use crate::{
    abstract_trait::cart::CartQueryRepositoryTrait,
    model::cart::{Cart as CartModel, CartLine},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub struct MemoryCartQueryRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryCartQueryRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartQueryRepositoryTrait for MemoryCartQueryRepository {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<CartModel>, RepositoryError> {
        Ok(self.db.read(|state| state.cart_by_user(user_id).cloned()))
    }

    async fn find_lines(&self, cart_id: i32) -> Result<Vec<CartLine>, RepositoryError> {
        Ok(self.db.read(|state| {
            state
                .cart_items_of(cart_id)
                .filter_map(|item| state.join_line(item))
                .collect()
        }))
    }
}
