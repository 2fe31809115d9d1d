use crate::model::product::ProductWithCategory;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "24.99")]
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: i32,
    pub category_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductWithCategory> for ProductResponse {
    fn from(value: ProductWithCategory) -> Self {
        let ProductWithCategory {
            product,
            category_name,
        } = value;

        ProductResponse {
            id: product.product_id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            image_url: product.image_url,
            category_id: product.category_id,
            category_name,
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}
