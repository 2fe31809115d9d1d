use crate::model::{
    cart::{Cart as CartModel, CartItem as CartItemModel, CartLine},
    category::Category as CategoryModel,
    order::{Order as OrderModel, OrderItem as OrderItemModel},
    product::Product as ProductModel,
};
use chrono::{NaiveDateTime, Utc};
use parking_lot::Mutex;
use shared::errors::RepositoryError;
use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
    sync::Arc,
    time::Duration,
};
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Debug, Default)]
pub(crate) struct Sequences {
    category: i32,
    product: i32,
    cart: i32,
    cart_item: i32,
    order: i32,
    order_item: i32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Table {
    Category,
    Product,
    Cart,
    CartItem,
    Order,
    OrderItem,
}

impl Sequences {
    pub(crate) fn next(&mut self, table: Table) -> i32 {
        let counter = match table {
            Table::Category => &mut self.category,
            Table::Product => &mut self.product,
            Table::Cart => &mut self.cart,
            Table::CartItem => &mut self.cart_item,
            Table::Order => &mut self.order,
            Table::OrderItem => &mut self.order_item,
        };
        *counter += 1;
        *counter
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub(crate) sequences: Sequences,
    pub(crate) categories: BTreeMap<i32, CategoryModel>,
    pub(crate) products: BTreeMap<i32, ProductModel>,
    pub(crate) carts: BTreeMap<i32, CartModel>,
    pub(crate) cart_items: BTreeMap<i32, CartItemModel>,
    pub(crate) orders: BTreeMap<i32, OrderModel>,
    pub(crate) order_items: BTreeMap<i32, OrderItemModel>,
}

impl MemoryState {
    pub(crate) fn cart_by_user(&self, user_id: &str) -> Option<&CartModel> {
        self.carts.values().find(|cart| cart.user_id == user_id)
    }

    pub(crate) fn cart_items_of(&self, cart_id: i32) -> impl Iterator<Item = &CartItemModel> {
        self.cart_items
            .values()
            .filter(move |item| item.cart_id == cart_id)
    }

    pub(crate) fn join_line(&self, item: &CartItemModel) -> Option<CartLine> {
        self.products.get(&item.product_id).map(|product| CartLine {
            cart_item_id: item.cart_item_id,
            product_id: item.product_id,
            quantity: item.quantity,
            product_name: product.name.clone(),
            unit_price: product.price,
            stock: product.stock,
        })
    }
}

/// Shared handle over the in-memory tables.
pub struct MemoryDatabase {
    state: Mutex<MemoryState>,
    product_locks: Mutex<HashMap<i32, Arc<RowLock<()>>>>,
    cart_locks: Mutex<HashMap<String, Arc<RowLock<()>>>>,
    lock_timeout: Duration,
}

impl MemoryDatabase {
    pub fn new(lock_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MemoryState::default()),
            product_locks: Mutex::new(HashMap::new()),
            cart_locks: Mutex::new(HashMap::new()),
            lock_timeout,
        })
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&MemoryState) -> R) -> R {
        f(&*self.state.lock())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        f(&mut *self.state.lock())
    }

    pub(crate) async fn lock_product(
        &self,
        product_id: i32,
    ) -> Result<OwnedMutexGuard<()>, RepositoryError> {
        let lock = Self::row_lock(&self.product_locks, product_id);
        self.acquire(lock, || format!("product {product_id}")).await
    }

    pub(crate) async fn lock_cart(
        &self,
        user_id: &str,
    ) -> Result<OwnedMutexGuard<()>, RepositoryError> {
        let lock = Self::row_lock(&self.cart_locks, user_id.to_string());
        self.acquire(lock, || format!("cart of user {user_id}")).await
    }

    /// Drops lock entries nobody holds or waits on. A waiter owns a clone of
    /// the entry's `Arc`, so only idle entries have a strong count of one.
    pub(crate) fn prune_locks(&self) {
        self.product_locks
            .lock()
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        self.cart_locks
            .lock()
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    pub(crate) fn lock_entries(&self) -> usize {
        self.product_locks.lock().len() + self.cart_locks.lock().len()
    }

    fn row_lock<K: Eq + Hash>(
        locks: &Mutex<HashMap<K, Arc<RowLock<()>>>>,
        key: K,
    ) -> Arc<RowLock<()>> {
        locks.lock().entry(key).or_default().clone()
    }

    async fn acquire(
        &self,
        lock: Arc<RowLock<()>>,
        describe: impl FnOnce() -> String,
    ) -> Result<OwnedMutexGuard<()>, RepositoryError> {
        tokio::time::timeout(self.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| RepositoryError::Conflict(format!("lock wait timed out on {}", describe())))
    }
}
