use super::{CART_COLUMNS, CART_LINES_SQL};
use crate::{
    abstract_trait::cart::CartQueryRepositoryTrait,
    model::cart::{Cart as CartModel, CartLine},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

pub struct CartQueryRepository {
    db: ConnectionPool,
}

impl CartQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartQueryRepositoryTrait for CartQueryRepository {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<CartModel>, RepositoryError> {
        let sql = format!("SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1");

        sqlx::query_as::<_, CartModel>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch cart for user {user_id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })
    }

    async fn find_lines(&self, cart_id: i32) -> Result<Vec<CartLine>, RepositoryError> {
        sqlx::query_as::<_, CartLine>(CART_LINES_SQL)
            .bind(cart_id)
            .fetch_all(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch lines of cart {cart_id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })
    }
}
