use crate::{
    abstract_trait::{
        checkout::DynCheckoutService,
        order::service::{DynOrderCommandService, DynOrderQueryService},
    },
    domain::{
        requests::order::{CreateOrderRequest, UpdateOrderStatusRequest},
        response::order::OrderResponse,
    },
    middleware::{
        jwt::{AuthUser, auth_middleware},
        validate::SimpleValidatedJson,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use shared::{
    domain::responses::ApiResponse,
    errors::{HttpError, ServiceError, StockErrorResponse},
};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

/// Whether another user's order is reported as missing instead of forbidden.
#[derive(Debug, Clone, Copy)]
pub struct OrderVisibility {
    pub mask_forbidden: bool,
}

impl OrderVisibility {
    fn error(self, id: i32, err: ServiceError) -> HttpError {
        match err {
            ServiceError::Forbidden(_) if self.mask_forbidden => {
                HttpError::NotFound(format!("Order {id} not found"))
            }
            other => other.into(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed from the cart", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Empty cart, bad address or insufficient stock", body = StockErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Stock kept changing, retry"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn place_order(
    Extension(service): Extension<DynCheckoutService>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.place_order(&user_id, &body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Order",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own orders, newest first", body = ApiResponse<Vec<OrderResponse>>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_orders(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_user(&user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = ApiResponse<OrderResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_order(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(visibility): Extension<OrderVisibility>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .find_by_id(&user_id, id)
        .await
        .map_err(|err| visibility.error(id, err))?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    tag = "Order",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Unknown status or transition not allowed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Status changed concurrently"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_order_status(
    Extension(service): Extension<DynOrderCommandService>,
    Extension(visibility): Extension<OrderVisibility>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service
        .update_status(&user_id, id, &body)
        .await
        .map_err(|err| visibility.error(id, err))?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let visibility = OrderVisibility {
        mask_forbidden: app_state.mask_forbidden_orders,
    };

    OpenApiRouter::new()
        .route("/api/orders", post(place_order))
        .route("/api/orders", get(get_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", put(update_order_status))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.checkout_service.clone()))
        .layer(Extension(app_state.di_container.order_query.clone()))
        .layer(Extension(app_state.di_container.order_command.clone()))
        .layer(Extension(visibility))
        .layer(Extension(app_state.jwt_config.clone()))
}
