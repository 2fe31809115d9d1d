use crate::errors::repository::RepositoryError;
use jsonwebtoken::errors::Error as JwtError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// One cart line that could not be covered by the product's current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InsufficientStockLine {
    pub product_id: i32,
    pub product_name: String,
    pub requested: i32,
    pub available: i32,
}

impl fmt::Display for InsufficientStockLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Available: {}, Requested: {})",
            self.product_name, self.available, self.requested
        )
    }
}

fn join_lines(lines: &[InsufficientStockLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repo(RepositoryError),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Cart is empty")]
    CartEmpty,

    #[error("Insufficient stock for: {}", join_lines(.0))]
    InsufficientStock(Vec<InsufficientStockLine>),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid Token")]
    InvalidTokenType,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![message.into()])
    }

    pub fn insufficient(
        product_id: i32,
        product_name: impl Into<String>,
        requested: i32,
        available: i32,
    ) -> Self {
        ServiceError::InsufficientStock(vec![InsufficientStockLine {
            product_id,
            product_name: product_name.into(),
            requested,
            available,
        }])
    }
}

/// Lost races reported by storage surface as the domain conflict.
impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Repo(other),
        }
    }
}
