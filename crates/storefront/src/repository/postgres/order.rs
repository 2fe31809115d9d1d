use super::ORDER_COLUMNS;
use crate::{
    abstract_trait::order::repository::{OrderCommandRepositoryTrait, OrderQueryRepositoryTrait},
    model::order::{Order as OrderModel, OrderItem as OrderItemModel, OrderStatus},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<OrderModel>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1");

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch order {id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<OrderModel>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, order_id DESC"
        );

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch orders for user {user_id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })
    }

    async fn find_items(&self, order_ids: &[i32]) -> Result<Vec<OrderItemModel>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, OrderItemModel>(
            r#"
            SELECT order_item_id, order_id, product_id, product_name, quantity, unit_price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, order_item_id
            "#,
        )
        .bind(order_ids.to_vec())
        .fetch_all(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch order items: {err:?}");
            RepositoryError::from_sqlx(err)
        })
    }
}

pub struct OrderCommandRepository {
    db: ConnectionPool,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn update_status(
        &self,
        id: i32,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = $3,
                updated_at = clock_timestamp()
            WHERE order_id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(id)
            .bind(current)
            .bind(next)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to update status of order {id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })?;

        if order.is_some() {
            info!("🔄 Order {id} moved from {current} to {next}");
        }
        Ok(order)
    }
}
