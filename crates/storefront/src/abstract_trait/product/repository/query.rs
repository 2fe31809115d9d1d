use crate::model::product::ProductWithCategory;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProductQueryRepository = Arc<dyn ProductQueryRepositoryTrait + Send + Sync>;

/// How many cart lines and order lines still point at a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductReferences {
    pub cart_lines: i64,
    pub order_lines: i64,
}

impl ProductReferences {
    pub fn is_referenced(&self) -> bool {
        self.cart_lines > 0 || self.order_lines > 0
    }
}

#[async_trait]
pub trait ProductQueryRepositoryTrait {
    async fn find_all(
        &self,
        category_id: Option<i32>,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<ProductWithCategory>, RepositoryError>;
    async fn count_by_category(&self, category_id: i32) -> Result<i64, RepositoryError>;
    async fn count_references(&self, product_id: i32) -> Result<ProductReferences, RepositoryError>;
}
