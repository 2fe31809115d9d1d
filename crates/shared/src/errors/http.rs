use crate::errors::{
    error::{ErrorResponse, StockErrorResponse},
    repository::RepositoryError,
    service::{InsufficientStockLine, ServiceError},
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InsufficientStock(Vec<InsufficientStockLine>),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthenticated => {
                HttpError::Unauthorized("Authentication required".into())
            }

            ServiceError::Validation(errors) => HttpError::BadRequest(errors.join("; ")),

            ServiceError::CartEmpty => HttpError::BadRequest("Cart is empty".into()),

            ServiceError::InsufficientStock(lines) => HttpError::InsufficientStock(lines),

            ServiceError::InvalidTransition { from, to } => HttpError::BadRequest(format!(
                "Cannot change order status from {from} to {to}"
            )),

            ServiceError::NotFound(msg) => HttpError::NotFound(msg),

            ServiceError::Forbidden(msg) => HttpError::Forbidden(msg),

            ServiceError::Conflict(msg) => HttpError::Conflict(msg),

            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
                RepositoryError::Conflict(msg) | RepositoryError::AlreadyExists(msg) => {
                    HttpError::Conflict(msg)
                }
                RepositoryError::ForeignKey(msg) => {
                    HttpError::BadRequest(format!("Foreign key violation: {msg}"))
                }
                RepositoryError::Sqlx(err) => {
                    error!("❌ Storage failure: {err}");
                    HttpError::Internal("Repository error".into())
                }
            },

            ServiceError::Jwt(err) => HttpError::Unauthorized(format!("JWT error: {err}")),

            ServiceError::TokenExpired => HttpError::Unauthorized("Token expired".into()),

            ServiceError::InvalidTokenType => HttpError::Unauthorized("Invalid token type".into()),

            ServiceError::Internal(msg) => HttpError::Internal(msg),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            HttpError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            HttpError::InsufficientStock(items) => {
                let message = ServiceError::InsufficientStock(items.clone()).to_string();
                let body = Json(StockErrorResponse {
                    status: "error".into(),
                    message,
                    items,
                });
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
        };

        let body = Json(ErrorResponse {
            status: "error".into(),
            message: msg,
        });

        (status, body).into_response()
    }
}
