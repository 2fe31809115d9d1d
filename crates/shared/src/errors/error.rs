use crate::errors::service::InsufficientStockLine;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockErrorResponse {
    pub status: String,
    pub message: String,
    pub items: Vec<InsufficientStockLine>,
}
