use crate::{
    abstract_trait::{
        category::DynCategoryQueryRepository,
        product::{
            repository::{DynProductCommandRepository, DynProductQueryRepository},
            service::ProductCommandServiceTrait,
        },
    },
    domain::{
        requests::product::{CreateProductRequest, UpdateProductRequest, validate_price},
        response::product::ProductResponse,
    },
    model::{category::Category as CategoryModel, product::ProductWithCategory},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    domain::responses::ApiResponse,
    errors::ServiceError,
    utils::{Method, ServiceTracer, TracingContext},
};
use tracing::{info, warn};

/// Prices are stored with exactly two decimal places.
fn normalize_price(price: Decimal) -> Result<Decimal, ServiceError> {
    validate_price(&price).map_err(|err| {
        ServiceError::validation(
            err.message
                .map(|message| message.to_string())
                .unwrap_or_else(|| "Invalid price".to_string()),
        )
    })?;

    let mut price = price.round_dp(2);
    price.rescale(2);
    Ok(price)
}

#[derive(Clone)]
pub struct ProductCommandService {
    query: DynProductQueryRepository,
    command: DynProductCommandRepository,
    category_query: DynCategoryQueryRepository,
    tracer: ServiceTracer,
}

pub struct ProductCommandServiceDeps {
    pub query: DynProductQueryRepository,
    pub command: DynProductCommandRepository,
    pub category_query: DynCategoryQueryRepository,
}

impl ProductCommandService {
    pub fn new(deps: ProductCommandServiceDeps, registry: &mut Registry) -> Self {
        let ProductCommandServiceDeps {
            query,
            command,
            category_query,
        } = deps;

        Self {
            query,
            command,
            category_query,
            tracer: ServiceTracer::new("product-command-service", registry),
        }
    }

    async fn require_category(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        category_id: i32,
    ) -> Result<CategoryModel, ServiceError> {
        match self.category_query.find_by_id(category_id).await {
            Ok(Some(category)) => Ok(category),
            Ok(None) => {
                warn!("⚠️ Category {category_id} does not exist");
                self.tracer
                    .complete_error(tracing_ctx, method, "Category does not exist");
                Err(ServiceError::validation("Category does not exist"))
            }
            Err(err) => {
                self.tracer
                    .complete_error(tracing_ctx, method, "Failed to fetch category");
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn create_product(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        info!("🏗️ Creating product '{}'", req.name);

        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "create_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.name", req.name.clone()),
            ],
        );

        let price = match normalize_price(req.price) {
            Ok(price) => price,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, &err.to_string());
                return Err(err);
            }
        };

        let category = self
            .require_category(&tracing_ctx, method, req.category_id)
            .await?;

        let req = CreateProductRequest {
            price,
            ..req.clone()
        };

        let product = match self.command.create_product(&req).await {
            Ok(product) => product,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to create product");
                return Err(err.into());
            }
        };

        self.tracer
            .complete_success(&tracing_ctx, method, "Product created");

        Ok(ApiResponse {
            status: "success".into(),
            message: "Product created successfully".into(),
            data: ProductWithCategory {
                product,
                category_name: category.name,
            }
            .into(),
        })
    }

    async fn update_product(
        &self,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracer.start(
            "update_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", req.id.to_string()),
            ],
        );

        let price = match normalize_price(req.price) {
            Ok(price) => price,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, &err.to_string());
                return Err(err);
            }
        };

        let category = self
            .require_category(&tracing_ctx, method, req.category_id)
            .await?;

        let req = UpdateProductRequest {
            price,
            ..req.clone()
        };

        let product = match self.command.update_product(&req).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Product not found");
                return Err(ServiceError::NotFound(format!(
                    "Product {} not found",
                    req.id
                )));
            }
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to update product");
                return Err(err.into());
            }
        };

        self.tracer
            .complete_success(&tracing_ctx, method, "Product updated");

        Ok(ApiResponse {
            status: "success".into(),
            message: "Product updated successfully".into(),
            data: ProductWithCategory {
                product,
                category_name: category.name,
            }
            .into(),
        })
    }

    async fn delete_product(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "delete_product",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id.to_string()),
            ],
        );

        let references = match self.query.count_references(id).await {
            Ok(references) => references,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to check product usage");
                return Err(err.into());
            }
        };

        if references.is_referenced() {
            self.tracer
                .complete_error(&tracing_ctx, method, "Product is still referenced");
            return Err(ServiceError::Conflict(format!(
                "Product {id} is referenced by {} cart line(s) and {} order line(s)",
                references.cart_lines, references.order_lines
            )));
        }

        match self.command.delete_product(id).await {
            Ok(true) => {}
            Ok(false) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Product not found");
                return Err(ServiceError::NotFound(format!("Product {id} not found")));
            }
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to delete product");
                return Err(err.into());
            }
        }

        info!("🗑️ Deleted product ID {id}");
        self.tracer
            .complete_success(&tracing_ctx, method, "Product deleted");

        Ok(ApiResponse {
            status: "success".into(),
            message: "Product deleted successfully".into(),
            data: (),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_price;
    use rust_decimal_macros::dec;
    use shared::errors::ServiceError;

    #[test]
    fn prices_keep_two_decimal_places() {
        assert_eq!(normalize_price(dec!(24.999)).unwrap().to_string(), "25.00");
        assert_eq!(normalize_price(dec!(10)).unwrap().to_string(), "10.00");
        assert_eq!(normalize_price(dec!(3.5)).unwrap().to_string(), "3.50");
    }

    #[test]
    fn prices_outside_the_column_are_rejected() {
        assert!(matches!(
            normalize_price(dec!(1000000000000000000000000)),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            normalize_price(dec!(0)),
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(
            normalize_price(dec!(9999999999999999.99)).unwrap().to_string(),
            "9999999999999999.99"
        );
    }
}
