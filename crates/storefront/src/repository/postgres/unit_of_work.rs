use super::{CART_COLUMNS, CART_LINES_SQL, ORDER_COLUMNS, PRODUCT_COLUMNS};
use crate::{
    abstract_trait::unit_of_work::{StockStoreTrait, UnitOfWorkFactoryTrait, UnitOfWorkTrait},
    domain::requests::order::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
    model::{
        cart::{Cart as CartModel, CartLine},
        order::{Order as OrderModel, OrderItem as OrderItemModel},
        product::Product as ProductModel,
    },
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{error, info, warn};

/// Opens READ COMMITTED transactions with a bounded lock wait.
pub struct PgUnitOfWorkFactory {
    db: ConnectionPool,
    lock_timeout: Duration,
}

impl PgUnitOfWorkFactory {
    pub fn new(db: ConnectionPool, lock_timeout: Duration) -> Self {
        Self { db, lock_timeout }
    }
}

#[async_trait]
impl UnitOfWorkFactoryTrait for PgUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkTrait>, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(|err| {
            error!("❌ Failed to open transaction: {err:?}");
            RepositoryError::from_sqlx(err)
        })?;

        let statement = format!("SET LOCAL lock_timeout = {}", self.lock_timeout.as_millis());
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StockStoreTrait for PgUnitOfWork {
    async fn read_stock(&mut self, product_id: i32) -> Result<Option<ProductModel>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(product_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn compare_and_decrement(
        &mut self,
        product_id: i32,
        quantity: i32,
        expected_version: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE products
            SET stock = stock - $2,
                version = version + 1,
                updated_at = current_timestamp
            WHERE product_id = $1 AND version = $3 AND stock >= $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(product_id)
            .bind(quantity)
            .bind(expected_version)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|err| {
                warn!("⚠️ Stock decrement of product {product_id} failed: {err:?}");
                RepositoryError::from_sqlx(err)
            })
    }

    async fn increment_stock(
        &mut self,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductModel, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE products
            SET stock = stock + $2,
                version = version + 1,
                updated_at = current_timestamp
            WHERE product_id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(product_id)
            .bind(quantity)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(RepositoryError::from_sqlx)?
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl UnitOfWorkTrait for PgUnitOfWork {
    async fn lock_cart(&mut self, user_id: &str) -> Result<Option<CartModel>, RepositoryError> {
        let sql = format!("SELECT {CART_COLUMNS} FROM carts WHERE user_id = $1 FOR UPDATE");

        sqlx::query_as::<_, CartModel>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn lock_or_create_cart(&mut self, user_id: &str) -> Result<CartModel, RepositoryError> {
        // ON CONFLICT DO UPDATE takes the row lock on the existing cart.
        let sql = format!(
            r#"
            INSERT INTO carts (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = current_timestamp
            RETURNING {CART_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CartModel>(&sql)
            .bind(user_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|err| {
                error!("❌ Failed to get or create cart for user {user_id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })
    }

    async fn cart_lines(&mut self, cart_id: i32) -> Result<Vec<CartLine>, RepositoryError> {
        sqlx::query_as::<_, CartLine>(CART_LINES_SQL)
            .bind(cart_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn find_product(
        &mut self,
        product_id: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");

        sqlx::query_as::<_, ProductModel>(&sql)
            .bind(product_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn upsert_cart_line(
        &mut self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *self.tx)
        .await
        .map_err(|err| {
            error!("❌ Failed to save line {product_id} of cart {cart_id}: {err:?}");
            RepositoryError::from_sqlx(err)
        })?;

        Ok(())
    }

    async fn delete_cart_line(
        &mut self,
        cart_id: i32,
        product_id: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&mut *self.tx)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_cart(&mut self, cart_id: i32) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *self.tx)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(result.rows_affected())
    }

    async fn insert_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO orders (user_id, total_amount, shipping_address, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(&req.user_id)
            .bind(req.total_amount)
            .bind(&req.shipping_address)
            .bind(req.status)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|err| {
                error!("❌ Failed to create order for user {}: {err:?}", req.user_id);
                RepositoryError::from_sqlx(err)
            })?;

        info!(
            "✅ Created order ID {} for user {}",
            order.order_id, order.user_id
        );
        Ok(order)
    }

    async fn insert_order_item(
        &mut self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItemModel, RepositoryError> {
        sqlx::query_as::<_, OrderItemModel>(
            r#"
            INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING order_item_id, order_id, product_id, product_name, quantity, unit_price
            "#,
        )
        .bind(req.order_id)
        .bind(req.product_id)
        .bind(&req.product_name)
        .bind(req.quantity)
        .bind(req.unit_price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|err| {
            error!(
                "❌ Failed to create item {} of order {}: {err:?}",
                req.product_id, req.order_id
            );
            RepositoryError::from_sqlx(err)
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(|err| {
            error!("❌ Failed to commit transaction: {err:?}");
            RepositoryError::from_sqlx(err)
        })
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.rollback().await.map_err(RepositoryError::from_sqlx)
    }
}
