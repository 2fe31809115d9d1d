use crate::{
    abstract_trait::{
        category::{
            CategoryServiceTrait, DynCategoryCommandRepository, DynCategoryQueryRepository,
        },
        product::repository::DynProductQueryRepository,
    },
    domain::{
        requests::category::{CreateCategoryRequest, UpdateCategoryRequest},
        response::category::CategoryResponse,
    },
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::responses::ApiResponse,
    errors::ServiceError,
    utils::{Method, ServiceTracer},
};
use tracing::{error, info};

#[derive(Clone)]
pub struct CategoryService {
    query: DynCategoryQueryRepository,
    command: DynCategoryCommandRepository,
    product_query: DynProductQueryRepository,
    tracer: ServiceTracer,
}

pub struct CategoryServiceDeps {
    pub query: DynCategoryQueryRepository,
    pub command: DynCategoryCommandRepository,
    pub product_query: DynProductQueryRepository,
}

impl CategoryService {
    pub fn new(deps: CategoryServiceDeps, registry: &mut Registry) -> Self {
        let CategoryServiceDeps {
            query,
            command,
            product_query,
        } = deps;

        Self {
            query,
            command,
            product_query,
            tracer: ServiceTracer::new("category-service", registry),
        }
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    async fn find_all(&self) -> Result<ApiResponse<Vec<CategoryResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_all_categories",
            vec![KeyValue::new("component", "category")],
        );

        let categories = match self.query.find_all().await {
            Ok(categories) => categories,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch categories");
                return Err(err.into());
            }
        };

        let data: Vec<CategoryResponse> =
            categories.into_iter().map(CategoryResponse::from).collect();

        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Fetched {} categories", data.len()),
        );

        Ok(ApiResponse {
            status: "success".into(),
            message: "Categories retrieved successfully".into(),
            data,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<CategoryResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_category_by_id",
            vec![
                KeyValue::new("component", "category"),
                KeyValue::new("category.id", id.to_string()),
            ],
        );

        let category = match self.query.find_by_id(id).await {
            Ok(Some(category)) => category,
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category not found");
                return Err(ServiceError::NotFound(format!("Category {id} not found")));
            }
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch category");
                return Err(err.into());
            }
        };

        self.tracer
            .complete_success(&tracing_ctx, method, "Category retrieved");

        Ok(ApiResponse {
            status: "success".into(),
            message: "Category retrieved successfully".into(),
            data: category.into(),
        })
    }

    async fn create_category(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<ApiResponse<CategoryResponse>, ServiceError> {
        info!("🏗️ Creating category '{}'", req.name);

        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "create_category",
            vec![
                KeyValue::new("component", "category"),
                KeyValue::new("category.name", req.name.clone()),
            ],
        );

        let category = match self.command.create_category(req).await {
            Ok(category) => category,
            Err(err) => {
                error!("❌ Failed to create category '{}': {err:?}", req.name);
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to create category");
                return Err(err.into());
            }
        };

        self.tracer
            .complete_success(&tracing_ctx, method, "Category created");

        Ok(ApiResponse {
            status: "success".into(),
            message: "Category created successfully".into(),
            data: category.into(),
        })
    }

    async fn update_category(
        &self,
        req: &UpdateCategoryRequest,
    ) -> Result<ApiResponse<CategoryResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracer.start(
            "update_category",
            vec![
                KeyValue::new("component", "category"),
                KeyValue::new("category.id", req.id.to_string()),
            ],
        );

        let category = match self.command.update_category(req).await {
            Ok(Some(category)) => category,
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category not found");
                return Err(ServiceError::NotFound(format!(
                    "Category {} not found",
                    req.id
                )));
            }
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to update category");
                return Err(err.into());
            }
        };

        self.tracer
            .complete_success(&tracing_ctx, method, "Category updated");

        Ok(ApiResponse {
            status: "success".into(),
            message: "Category updated successfully".into(),
            data: category.into(),
        })
    }

    async fn delete_category(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "delete_category",
            vec![
                KeyValue::new("component", "category"),
                KeyValue::new("category.id", id.to_string()),
            ],
        );

        let in_use = match self.product_query.count_by_category(id).await {
            Ok(count) => count,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to check category usage");
                return Err(err.into());
            }
        };

        if in_use > 0 {
            self.tracer
                .complete_error(&tracing_ctx, method, "Category still has products");
            return Err(ServiceError::Conflict(format!(
                "Category {id} still has {in_use} product(s)"
            )));
        }

        match self.command.delete_category(id).await {
            Ok(true) => {}
            Ok(false) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Category not found");
                return Err(ServiceError::NotFound(format!("Category {id} not found")));
            }
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to delete category");
                return Err(err.into());
            }
        }

        info!("🗑️ Deleted category ID {id}");
        self.tracer
            .complete_success(&tracing_ctx, method, "Category deleted");

        Ok(ApiResponse {
            status: "success".into(),
            message: "Category deleted successfully".into(),
            data: (),
        })
    }
}
