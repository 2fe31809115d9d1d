use super::store::{MemoryDatabase, Table, now};
use crate::{
    abstract_trait::category::{CategoryCommandRepositoryTrait, CategoryQueryRepositoryTrait},
    domain::requests::category::{CreateCategoryRequest, UpdateCategoryRequest},
    model::category::Category as CategoryModel,
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;
use tracing::info;

pub struct MemoryCategoryQueryRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryCategoryQueryRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryQueryRepositoryTrait for MemoryCategoryQueryRepository {
    async fn find_all(&self) -> Result<Vec<CategoryModel>, RepositoryError> {
        let mut categories: Vec<CategoryModel> =
            self.db.read(|state| state.categories.values().cloned().collect());
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.category_id.cmp(&b.category_id)));

        Ok(categories)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CategoryModel>, RepositoryError> {
        Ok(self.db.read(|state| state.categories.get(&id).cloned()))
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(self.db.read(|state| state.categories.len() as i64))
    }
}

pub struct MemoryCategoryCommandRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryCategoryCommandRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryCommandRepositoryTrait for MemoryCategoryCommandRepository {
    async fn create_category(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<CategoryModel, RepositoryError> {
        let category = self.db.write(|state| {
            let timestamp = now();
            let category = CategoryModel {
                category_id: state.sequences.next(Table::Category),
                name: req.name.clone(),
                description: req.description.clone(),
                created_at: timestamp,
                updated_at: timestamp,
            };
            state
                .categories
                .insert(category.category_id, category.clone());
            category
        });

        info!("✅ Created category ID {}", category.category_id);
        Ok(category)
    }

    async fn update_category(
        &self,
        req: &UpdateCategoryRequest,
    ) -> Result<Option<CategoryModel>, RepositoryError> {
        Ok(self.db.write(|state| {
            state.categories.get_mut(&req.id).map(|category| {
                category.name = req.name.clone();
                category.description = req.description.clone();
                category.updated_at = now();
                category.clone()
            })
        }))
    }

    async fn delete_category(&self, id: i32) -> Result<bool, RepositoryError> {
        self.db.write(|state| {
            if state.products.values().any(|p| p.category_id == id) {
                return Err(RepositoryError::ForeignKey(format!(
                    "category {id} is referenced by products"
                )));
            }
            Ok(state.categories.remove(&id).is_some())
        })
    }
}
