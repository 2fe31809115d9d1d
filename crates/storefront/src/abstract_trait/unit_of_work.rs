use crate::{
    domain::requests::order::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
    model::{
        cart::{Cart as CartModel, CartLine},
        order::{Order as OrderModel, OrderItem as OrderItemModel},
        product::Product as ProductModel,
    },
};
use async_trait::async_trait;
use mockall::automock;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynUnitOfWorkFactory = Arc<dyn UnitOfWorkFactoryTrait + Send + Sync>;

#[async_trait]
pub trait UnitOfWorkFactoryTrait {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkTrait>, RepositoryError>;
}

/// Stock access used by the inventory ledger.
#[automock]
#[async_trait]
pub trait StockStoreTrait: Send {
    /// Reads the product's current stock and version.
    async fn read_stock(&mut self, product_id: i32) -> Result<Option<ProductModel>, RepositoryError>;

    /// Decrements stock only if the row still carries `expected_version` and
    /// holds at least `quantity`. `None` means the compare-and-swap lost.
    async fn compare_and_decrement(
        &mut self,
        product_id: i32,
        quantity: i32,
        expected_version: i32,
    ) -> Result<Option<ProductModel>, RepositoryError>;

    async fn increment_stock(
        &mut self,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductModel, RepositoryError>;
}

/// One all-or-nothing transaction over carts, stock and orders.
///
/// Dropping a unit of work without committing discards every write.
#[async_trait]
pub trait UnitOfWorkTrait: StockStoreTrait + Send {
    /// Locks the user's cart row, if the user has a cart.
    async fn lock_cart(&mut self, user_id: &str) -> Result<Option<CartModel>, RepositoryError>;

    /// Locks the user's cart row, creating the cart first if needed.
    async fn lock_or_create_cart(&mut self, user_id: &str) -> Result<CartModel, RepositoryError>;

    /// Lines of the cart in insertion order, joined with current product data.
    async fn cart_lines(&mut self, cart_id: i32) -> Result<Vec<CartLine>, RepositoryError>;

    async fn find_product(&mut self, product_id: i32)
    -> Result<Option<ProductModel>, RepositoryError>;

    /// Inserts the line or replaces its quantity.
    async fn upsert_cart_line(
        &mut self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<(), RepositoryError>;

    async fn delete_cart_line(&mut self, cart_id: i32, product_id: i32)
    -> Result<bool, RepositoryError>;

    async fn clear_cart(&mut self, cart_id: i32) -> Result<u64, RepositoryError>;

    async fn insert_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError>;

    async fn insert_order_item(
        &mut self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItemModel, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
