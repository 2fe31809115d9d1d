use super::store::{MemoryDatabase, now};
use crate::{
    abstract_trait::order::repository::{OrderCommandRepositoryTrait, OrderQueryRepositoryTrait},
    model::order::{Order as OrderModel, OrderItem as OrderItemModel, OrderStatus},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub struct MemoryOrderQueryRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryOrderQueryRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for MemoryOrderQueryRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<OrderModel>, RepositoryError> {
        Ok(self.db.read(|state| state.orders.get(&id).cloned()))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<OrderModel>, RepositoryError> {
        let mut orders: Vec<OrderModel> = self.db.read(|state| {
            state
                .orders
                .values()
                .filter(|order| order.user_id == user_id)
                .cloned()
                .collect()
        });
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.order_id.cmp(&a.order_id))
        });

        Ok(orders)
    }

    async fn find_items(&self, order_ids: &[i32]) -> Result<Vec<OrderItemModel>, RepositoryError> {
        let mut items: Vec<OrderItemModel> = self.db.read(|state| {
            state
                .order_items
                .values()
                .filter(|item| order_ids.contains(&item.order_id))
                .cloned()
                .collect()
        });
        items.sort_by_key(|item| (item.order_id, item.order_item_id));

        Ok(items)
    }
}

pub struct MemoryOrderCommandRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryOrderCommandRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for MemoryOrderCommandRepository {
    async fn update_status(
        &self,
        id: i32,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        Ok(self.db.write(|state| {
            state
                .orders
                .get_mut(&id)
                .filter(|order| order.status == current)
                .map(|order| {
                    order.status = next;
                    order.updated_at = now();
                    order.clone()
                })
        }))
    }
}
