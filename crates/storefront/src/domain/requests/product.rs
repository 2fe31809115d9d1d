use crate::model::cart::MAX_AMOUNT;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// Checks the price as it will be stored, rounded to two decimal places.
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let stored = price.round_dp(2);

    if stored < Decimal::new(1, 2) {
        return Err(ValidationError::new("range").with_message("Price must be at least 0.01".into()));
    }
    if stored > MAX_AMOUNT {
        return Err(ValidationError::new("range")
            .with_message(format!("Price must be at most {MAX_AMOUNT}").into()));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, IntoParams, Clone, Default)]
pub struct FindAllProducts {
    pub category_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema, Clone)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "24.99")]
    pub price: Decimal,

    #[validate(range(min = 0))]
    pub stock: i32,

    #[validate(length(max = 500))]
    pub image_url: Option<String>,

    #[validate(range(min = 1))]
    pub category_id: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema, Clone)]
pub struct UpdateProductRequest {
    #[serde(skip)]
    pub id: i32,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "24.99")]
    pub price: Decimal,

    #[validate(range(min = 0))]
    pub stock: i32,

    #[validate(length(max = 500))]
    pub image_url: Option<String>,

    #[validate(range(min = 1))]
    pub category_id: i32,
}
