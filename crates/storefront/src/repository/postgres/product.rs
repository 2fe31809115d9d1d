use super::PRODUCT_COLUMNS;
use crate::{
    abstract_trait::product::repository::{
        ProductCommandRepositoryTrait, ProductQueryRepositoryTrait, ProductReferences,
    },
    domain::requests::product::{CreateProductRequest, UpdateProductRequest},
    model::product::{Product as ProductModel, ProductWithCategory},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

const PRODUCT_WITH_CATEGORY_SQL: &str = r#"
    SELECT p.product_id, p.category_id, p.name, p.description, p.price, p.stock,
           p.image_url, p.version, p.created_at, p.updated_at,
           c.name AS category_name
    FROM products p
    JOIN categories c ON c.category_id = p.category_id
"#;

pub struct ProductQueryRepository {
    db: ConnectionPool,
}

impl ProductQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for ProductQueryRepository {
    async fn find_all(
        &self,
        category_id: Option<i32>,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let sql = format!(
            "{PRODUCT_WITH_CATEGORY_SQL} WHERE ($1::INT IS NULL OR p.category_id = $1) ORDER BY p.product_id"
        );

        sqlx::query_as::<_, ProductWithCategory>(&sql)
            .bind(category_id)
            .fetch_all(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch products: {err:?}");
                RepositoryError::from_sqlx(err)
            })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ProductWithCategory>, RepositoryError> {
        let sql = format!("{PRODUCT_WITH_CATEGORY_SQL} WHERE p.product_id = $1");

        sqlx::query_as::<_, ProductWithCategory>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch product {id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })
    }

    async fn count_by_category(&self, category_id: i32) -> Result<i64, RepositoryError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.db)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn count_references(&self, product_id: i32) -> Result<ProductReferences, RepositoryError> {
        let (cart_lines, order_lines) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM cart_items WHERE product_id = $1),
                (SELECT COUNT(*) FROM order_items WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(ProductReferences {
            cart_lines,
            order_lines,
        })
    }
}

pub struct ProductCommandRepository {
    db: ConnectionPool,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ProductModel, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO products (category_id, name, description, price, stock, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, ProductModel>(&sql)
            .bind(req.category_id)
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.price)
            .bind(req.stock)
            .bind(&req.image_url)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to create product {}: {err:?}", req.name);
                RepositoryError::from_sqlx(err)
            })?;

        info!("✅ Created product ID {}", product.product_id);
        Ok(product)
    }

    async fn update_product(
        &self,
        req: &UpdateProductRequest,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let sql = format!(
            r#"
            UPDATE products
            SET category_id = $2,
                name = $3,
                description = $4,
                price = $5,
                stock = $6,
                image_url = $7,
                version = version + 1,
                updated_at = current_timestamp
            WHERE product_id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, ProductModel>(&sql)
            .bind(req.id)
            .bind(req.category_id)
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.price)
            .bind(req.stock)
            .bind(&req.image_url)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to update product {}: {err:?}", req.id);
                RepositoryError::from_sqlx(err)
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
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to delete product {id}: {err:?}");
                RepositoryError::from_sqlx(err)
            })?;

        info!("🗑️ Deleted product ID {id}");
        Ok(result.rows_affected() > 0)
    }
}
