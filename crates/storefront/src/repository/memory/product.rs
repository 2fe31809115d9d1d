use super::store::{MemoryDatabase, MemoryState, Table, now};
use crate::{
    abstract_trait::product::repository::{
        ProductCommandRepositoryTrait, ProductQueryRepositoryTrait, ProductReferences,
    },
    domain::requests::product::{CreateProductRequest, UpdateProductRequest},
    model::product::{Product as ProductModel, ProductWithCategory},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;
use tracing::info;

fn with_category(state: &MemoryState, product: &ProductModel) -> Option<ProductWithCategory> {
    state
        .categories
        .get(&product.category_id)
        .map(|category| ProductWithCategory {
            product: product.clone(),
            category_name: category.name.clone(),
        })
}

fn references(state: &MemoryState, product_id: i32) -> ProductReferences {
    ProductReferences {
        cart_lines: state
            .cart_items
            .values()
            .filter(|item| item.product_id == product_id)
            .count() as i64,
        order_lines: state
            .order_items
            .values()
            .filter(|item| item.product_id == product_id)
            .count() as i64,
    }
}

pub struct MemoryProductQueryRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryProductQueryRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for MemoryProductQueryRepository {
    async fn find_all(
        &self,
        category_id: Option<i32>,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        Ok(self.db.read(|state| {
            state
                .products
                .values()
                .filter(|p| category_id.is_none_or(|id| p.category_id == id))
                .filter_map(|p| with_category(state, p))
                .collect()
        }))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductWithCategory>, RepositoryError> {
        Ok(self.db.read(|state| {
            state
                .products
                .get(&id)
                .and_then(|p| with_category(state, p))
        }))
    }

    async fn count_by_category(&self, category_id: i32) -> Result<i64, RepositoryError> {
        Ok(self.db.read(|state| {
            state
                .products
                .values()
                .filter(|p| p.category_id == category_id)
                .count() as i64
        }))
    }

    async fn count_references(&self, product_id: i32) -> Result<ProductReferences, RepositoryError> {
        Ok(self.db.read(|state| references(state, product_id)))
    }
}

pub struct MemoryProductCommandRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryProductCommandRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for MemoryProductCommandRepository {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let product = self.db.write(|state| {
            if !state.categories.contains_key(&req.category_id) {
                return Err(RepositoryError::ForeignKey(format!(
                    "category {} does not exist",
                    req.category_id
                )));
            }

            let timestamp = now();
            let product = ProductModel {
                product_id: state.sequences.next(Table::Product),
                category_id: req.category_id,
                name: req.name.clone(),
                description: req.description.clone(),
                price: req.price,
                stock: req.stock,
                image_url: req.image_url.clone(),
                version: 0,
                created_at: timestamp,
                updated_at: timestamp,
            };
            state.products.insert(product.product_id, product.clone());
            Ok(product)
        })?;

        info!("✅ Created product ID {}", product.product_id);
        Ok(product)
    }

    async fn update_product(
        &self,
        req: &UpdateProductRequest,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let _row = self.db.lock_product(req.id).await?;

        let product = self.db.write(|state| {
            if !state.categories.contains_key(&req.category_id) {
                return Err(RepositoryError::ForeignKey(format!(
                    "category {} does not exist",
                    req.category_id
                )));
            }

            Ok(state.products.get_mut(&req.id).map(|product| {
                product.category_id = req.category_id;
                product.name = req.name.clone();
                product.description = req.description.clone();
                product.price = req.price;
                product.stock = req.stock;
                product.image_url = req.image_url.clone();
                product.version += 1;
                product.updated_at = now();
                product.clone()
            }))
        })?;

        if let Some(product) = &product {
            info!(
                "🔄 Updated product ID {} (version {})",
                product.product_id, product.version
            );
        }
        Ok(product)
    }

    async fn delete_product(&self, id: i32) -> Result<bool, RepositoryError> {
        let _row = self.db.lock_product(id).await?;

        self.db.write(|state| {
            if references(state, id).is_referenced() {
                return Err(RepositoryError::ForeignKey(format!(
                    "product {id} is referenced by cart or order lines"
                )));
            }
            Ok(state.products.remove(&id).is_some())
        })
    }
}
