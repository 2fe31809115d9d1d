use crate::{
    abstract_trait::cart::DynCartService,
    domain::{
        requests::cart::{AddCartItemRequest, UpdateCartItemRequest},
        response::cart::CartResponse,
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
    routing::{delete, get, post, put},
};
use shared::{domain::responses::ApiResponse, errors::HttpError};
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/cart",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current cart, empty when the user has none", body = ApiResponse<CartResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_cart(
    Extension(service): Extension<DynCartService>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.get_cart(&user_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    tag = "Cart",
    security(("bearer_auth" = [])),
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Item added, updated cart", body = ApiResponse<CartResponse>),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_cart_item(
    Extension(service): Extension<DynCartService>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    SimpleValidatedJson(body): SimpleValidatedJson<AddCartItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.add_item(&user_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/cart/items/{product_id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("product_id" = i32, Path, description = "Product ID of the cart line")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity set, updated cart", body = ApiResponse<CartResponse>),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cart or line not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_cart_item(
    Extension(service): Extension<DynCartService>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(product_id): Path<i32>,
    SimpleValidatedJson(body): SimpleValidatedJson<UpdateCartItemRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.update_item(&user_id, product_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{product_id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("product_id" = i32, Path, description = "Product ID of the cart line")),
    responses(
        (status = 200, description = "Line removed, updated cart", body = ApiResponse<CartResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cart or line not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn remove_cart_item(
    Extension(service): Extension<DynCartService>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.remove_item(&user_id, product_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/cart",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Cart cleared"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn clear_cart(
    Extension(service): Extension<DynCartService>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    service.clear_cart(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn cart_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart", delete(clear_cart))
        .route("/api/cart/items", post(add_cart_item))
        .route("/api/cart/items/{product_id}", put(update_cart_item))
        .route("/api/cart/items/{product_id}", delete(remove_cart_item))
        .route_layer(middleware::from_fn(auth_middleware))
        .layer(Extension(app_state.di_container.cart_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
