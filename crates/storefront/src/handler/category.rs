use crate::{
    abstract_trait::category::DynCategoryService,
    domain::{
        requests::category::{CreateCategoryRequest, UpdateCategoryRequest},
        response::category::CategoryResponse,
    },
    middleware::{jwt::auth_middleware, validate::SimpleValidatedJson},
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
    path = "/api/categories",
    tag = "Category",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_categories(
    Extension(service): Extension<DynCategoryService>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_all().await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Category",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_category(
    Extension(service): Extension<DynCategoryService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_by_id(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Category",
    security(("bearer_auth" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_category(
    Extension(service): Extension<DynCategoryService>,
    SimpleValidatedJson(body): SimpleValidatedJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create_category(&body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Category",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_category(
    Extension(service): Extension<DynCategoryService>,
    Path(id): Path<i32>,
    SimpleValidatedJson(mut body): SimpleValidatedJson<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    body.id = id;
    let response = service.update_category(&body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Category",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = serde_json::Value),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has products"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_category(
    Extension(service): Extension<DynCategoryService>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.delete_category(id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn category_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    let public = OpenApiRouter::new()
        .route("/api/categories", get(get_categories))
        .route("/api/categories/{id}", get(get_category));

    let protected = OpenApiRouter::new()
        .route("/api/categories", post(create_category))
        .route("/api/categories/{id}", put(update_category))
        .route("/api/categories/{id}", delete(delete_category))
        .route_layer(middleware::from_fn(auth_middleware));

    public
        .merge(protected)
        .layer(Extension(app_state.di_container.category_service.clone()))
        .layer(Extension(app_state.jwt_config.clone()))
}
