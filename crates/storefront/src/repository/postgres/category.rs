use crate::{
    abstract_trait::category::{CategoryCommandRepositoryTrait, CategoryQueryRepositoryTrait},
    domain::requests::category::{CreateCategoryRequest, UpdateCategoryRequest},
    model::category::Category as CategoryModel,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

pub struct CategoryQueryRepository {
    db: ConnectionPool,
}

impl CategoryQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryQueryRepositoryTrait for CategoryQueryRepository {
    async fn find_all(&self) -> Result<Vec<CategoryModel>, RepositoryError> {
        sqlx::query_as::<_, CategoryModel>(
            r#"
            SELECT category_id, name, description, created_at, updated_at
            FROM categories
            ORDER BY name, category_id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch categories: {err:?}");
            RepositoryError::from_sqlx(err)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CategoryModel>, RepositoryError> {
        sqlx::query_as::<_, CategoryModel>(
            r#"
            SELECT category_id, name, description, created_at, updated_at
            FROM categories
            WHERE category_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch category {id}: {err:?}");
            RepositoryError::from_sqlx(err)
        })
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.db)
            .await
            .map_err(RepositoryError::from_sqlx)
    }
}

pub struct CategoryCommandRepository {
    db: ConnectionPool,
}

impl CategoryCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryCommandRepositoryTrait for CategoryCommandRepository {
    async fn create_category(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<CategoryModel, RepositoryError> {
        let category = sqlx::query_as::<_, CategoryModel>(
            r#"
            INSERT INTO categories (name, description)
            VALUES ($1, $2)
            RETURNING category_id, name, description, created_at, updated_at
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to create category {}: {err:?}", req.name);
            RepositoryError::from_sqlx(err)
        })?;

        info!("✅ Created category ID {}", category.category_id);
        Ok(category)
    }

    async fn update_category(
        &self,
        req: &UpdateCategoryRequest,
    ) -> Result<Option<CategoryModel>, RepositoryError> {
        let category = sqlx::query_as::<_, CategoryModel>(
            r#"
            UPDATE categories
            SET name = $2,
                description = $3,
                updated_at = current_timestamp
            WHERE category_id = $1
            RETURNING category_id, name, description, created_at, updated_at
            "#,
        )
        .bind(req.id)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_optional(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to update category {}: {err:?}", req.id);
            RepositoryError::from_sqlx(err)
        })?;

        if let Some(category) = &category {
            info!("🔄 Updated category ID {}", category.category_id);
        }
        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to delete category {id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })?;

        info!("🗑️ Deleted category ID {id}");
        Ok(result.rows_affected() > 0)
    }
}
