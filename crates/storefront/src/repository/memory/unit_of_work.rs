use super::store::{MemoryDatabase, MemoryState, Table, now};
use crate::{
    abstract_trait::unit_of_work::{StockStoreTrait, UnitOfWorkFactoryTrait, UnitOfWorkTrait},
    domain::requests::order::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
    model::{
        cart::{Cart as CartModel, CartItem as CartItemModel, CartLine},
        order::{Order as OrderModel, OrderItem as OrderItemModel},
        product::Product as ProductModel,
    },
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

pub struct MemoryUnitOfWorkFactory {
    db: Arc<MemoryDatabase>,
}

impl MemoryUnitOfWorkFactory {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UnitOfWorkFactoryTrait for MemoryUnitOfWorkFactory {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkTrait>, RepositoryError> {
        Ok(Box::new(MemoryUnitOfWork::new(self.db.clone())))
    }
}

/// Writes staged by a unit of work, invisible to others until commit.
#[derive(Debug, Default)]
struct Staged {
    products: HashMap<i32, ProductModel>,
    carts: BTreeMap<i32, CartModel>,
    /// `None` marks a deleted line.
    cart_items: BTreeMap<i32, Option<CartItemModel>>,
    orders: Vec<OrderModel>,
    order_items: Vec<OrderItemModel>,
}

impl Staged {
    fn product(&self, state: &MemoryState, product_id: i32) -> Option<ProductModel> {
        self.products
            .get(&product_id)
            .or_else(|| state.products.get(&product_id))
            .cloned()
    }

    fn cart(&self, state: &MemoryState, user_id: &str) -> Option<CartModel> {
        self.carts
            .values()
            .find(|cart| cart.user_id == user_id)
            .or_else(|| state.cart_by_user(user_id))
            .cloned()
    }

    fn cart_items(&self, state: &MemoryState, cart_id: i32) -> BTreeMap<i32, CartItemModel> {
        let mut items: BTreeMap<i32, CartItemModel> = state
            .cart_items_of(cart_id)
            .map(|item| (item.cart_item_id, item.clone()))
            .collect();

        for (id, staged) in &self.cart_items {
            match staged {
                Some(item) if item.cart_id == cart_id => {
                    items.insert(*id, item.clone());
                }
                Some(_) => {}
                None => {
                    items.remove(id);
                }
            }
        }

        items
    }
}

/// A unit of work over [`MemoryDatabase`].
///
/// Row locks are held until the unit of work is committed or dropped, then
/// idle lock entries are pruned from the database.
pub struct MemoryUnitOfWork {
    db: Arc<MemoryDatabase>,
    product_guards: HashMap<i32, OwnedMutexGuard<()>>,
    cart_guards: HashMap<String, OwnedMutexGuard<()>>,
    staged: Staged,
}

impl MemoryUnitOfWork {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self {
            db,
            product_guards: HashMap::new(),
            cart_guards: HashMap::new(),
            staged: Staged::default(),
        }
    }

    async fn hold_product(&mut self, product_id: i32) -> Result<(), RepositoryError> {
        if !self.product_guards.contains_key(&product_id) {
            let guard = self.db.lock_product(product_id).await?;
            self.product_guards.insert(product_id, guard);
        }
        Ok(())
    }

    async fn hold_cart(&mut self, user_id: &str) -> Result<(), RepositoryError> {
        if !self.cart_guards.contains_key(user_id) {
            let guard = self.db.lock_cart(user_id).await?;
            self.cart_guards.insert(user_id.to_string(), guard);
        }
        Ok(())
    }

    fn current_product(&self, product_id: i32) -> Option<ProductModel> {
        self.db
            .read(|state| self.staged.product(state, product_id))
    }

    fn current_cart_items(&self, cart_id: i32) -> BTreeMap<i32, CartItemModel> {
        self.db
            .read(|state| self.staged.cart_items(state, cart_id))
    }

    fn next_id(&self, table: Table) -> i32 {
        self.db.write(|state| state.sequences.next(table))
    }
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        self.product_guards.clear();
        self.cart_guards.clear();
        self.db.prune_locks();
    }
}

#[async_trait]
impl StockStoreTrait for MemoryUnitOfWork {
    async fn read_stock(&mut self, product_id: i32) -> Result<Option<ProductModel>, RepositoryError> {
        self.hold_product(product_id).await?;
        Ok(self.current_product(product_id))
    }

    async fn compare_and_decrement(
        &mut self,
        product_id: i32,
        quantity: i32,
        expected_version: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        self.hold_product(product_id).await?;

        let Some(mut product) = self.current_product(product_id) else {
            return Ok(None);
        };
        if product.version != expected_version || product.stock < quantity {
            debug!(
                "Decrement of product {product_id} skipped (version {}, expected {expected_version})",
                product.version
            );
            return Ok(None);
        }

        product.stock -= quantity;
        product.version += 1;
        product.updated_at = now();
        self.staged.products.insert(product_id, product.clone());

        Ok(Some(product))
    }

    async fn increment_stock(
        &mut self,
        product_id: i32,
        quantity: i32,
    ) -> Result<ProductModel, RepositoryError> {
        self.hold_product(product_id).await?;

        let mut product = self
            .current_product(product_id)
            .ok_or(RepositoryError::NotFound)?;
        product.stock += quantity;
        product.version += 1;
        product.updated_at = now();
        self.staged.products.insert(product_id, product.clone());

        Ok(product)
    }
}

#[async_trait]
impl UnitOfWorkTrait for MemoryUnitOfWork {
    async fn lock_cart(&mut self, user_id: &str) -> Result<Option<CartModel>, RepositoryError> {
        self.hold_cart(user_id).await?;
        Ok(self.db.read(|state| self.staged.cart(state, user_id)))
    }

    async fn lock_or_create_cart(&mut self, user_id: &str) -> Result<CartModel, RepositoryError> {
        if let Some(cart) = self.lock_cart(user_id).await? {
            return Ok(cart);
        }

        let timestamp = now();
        let cart = CartModel {
            cart_id: self.next_id(Table::Cart),
            user_id: user_id.to_string(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.staged.carts.insert(cart.cart_id, cart.clone());

        Ok(cart)
    }

    async fn cart_lines(&mut self, cart_id: i32) -> Result<Vec<CartLine>, RepositoryError> {
        let items = self.current_cart_items(cart_id);

        Ok(self.db.read(|state| {
            items
                .values()
                .filter_map(|item| {
                    self.staged
                        .product(state, item.product_id)
                        .map(|product| CartLine {
                            cart_item_id: item.cart_item_id,
                            product_id: item.product_id,
                            quantity: item.quantity,
                            product_name: product.name,
                            unit_price: product.price,
                            stock: product.stock,
                        })
                })
                .collect()
        }))
    }

    async fn find_product(
        &mut self,
        product_id: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        Ok(self.current_product(product_id))
    }

    async fn upsert_cart_line(
        &mut self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if quantity < 1 {
            return Err(RepositoryError::Conflict(format!(
                "cart line quantity must be positive, got {quantity}"
            )));
        }

        // Pins the product so it cannot be deleted under a staged line.
        self.hold_product(product_id).await?;
        if self.current_product(product_id).is_none() {
            return Err(RepositoryError::ForeignKey(format!(
                "product {product_id} does not exist"
            )));
        }

        let existing = self
            .current_cart_items(cart_id)
            .into_values()
            .find(|item| item.product_id == product_id);

        let item = match existing {
            Some(mut item) => {
                item.quantity = quantity;
                item
            }
            None => CartItemModel {
                cart_item_id: self.next_id(Table::CartItem),
                cart_id,
                product_id,
                quantity,
                created_at: now(),
            },
        };
        self.staged.cart_items.insert(item.cart_item_id, Some(item));

        Ok(())
    }

    async fn delete_cart_line(
        &mut self,
        cart_id: i32,
        product_id: i32,
    ) -> Result<bool, RepositoryError> {
        let existing = self
            .current_cart_items(cart_id)
            .into_values()
            .find(|item| item.product_id == product_id);

        match existing {
            Some(item) => {
                self.staged.cart_items.insert(item.cart_item_id, None);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_cart(&mut self, cart_id: i32) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = self.current_cart_items(cart_id).into_keys().collect();
        for id in &ids {
            self.staged.cart_items.insert(*id, None);
        }

        Ok(ids.len() as u64)
    }

    async fn insert_order(
        &mut self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let timestamp = now();
        let order = OrderModel {
            order_id: self.next_id(Table::Order),
            user_id: req.user_id.clone(),
            total_amount: req.total_amount,
            shipping_address: req.shipping_address.clone(),
            status: req.status,
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.staged.orders.push(order.clone());

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
        let item = OrderItemModel {
            order_item_id: self.next_id(Table::OrderItem),
            order_id: req.order_id,
            product_id: req.product_id,
            product_name: req.product_name.clone(),
            quantity: req.quantity,
            unit_price: req.unit_price,
        };
        self.staged.order_items.push(item.clone());

        Ok(item)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut uow = self;
        let staged = std::mem::take(&mut uow.staged);

        uow.db.write(|state| {
            for (id, product) in staged.products {
                if let Some(row) = state.products.get_mut(&id) {
                    *row = product;
                }
            }
            state.carts.extend(staged.carts);
            for (id, item) in staged.cart_items {
                match item {
                    Some(item) => {
                        state.cart_items.insert(id, item);
                    }
                    None => {
                        state.cart_items.remove(&id);
                    }
                }
            }
            for order in staged.orders {
                state.orders.insert(order.order_id, order);
            }
            for item in staged.order_items {
                state.order_items.insert(item.order_item_id, item);
            }
        });

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        debug!("🔄 Discarding in-memory unit of work");
        Ok(())
    }
}
