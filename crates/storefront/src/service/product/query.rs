use crate::{
    abstract_trait::product::{
        repository::DynProductQueryRepository, service::ProductQueryServiceTrait,
    },
    domain::{requests::product::FindAllProducts, response::product::ProductResponse},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::responses::ApiResponse,
    errors::ServiceError,
    utils::{Method, ServiceTracer},
};

#[derive(Clone)]
pub struct ProductQueryService {
    query: DynProductQueryRepository,
    tracer: ServiceTracer,
}

impl ProductQueryService {
    pub fn new(query: DynProductQueryRepository, registry: &mut Registry) -> Self {
        Self {
            query,
            tracer: ServiceTracer::new("product-query-service", registry),
        }
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_all(
        &self,
        req: &FindAllProducts,
    ) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_all_products",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new(
                    "product.category_id",
                    req.category_id.map(|id| id.to_string()).unwrap_or_default(),
                ),
            ],
        );

        let products = match self.query.find_all(req.category_id).await {
            Ok(products) => products,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch products");
                return Err(err.into());
            }
        };

        let data: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();

        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Fetched {} products", data.len()),
        );

        Ok(ApiResponse {
            status: "success".into(),
            message: "Products retrieved successfully".into(),
            data,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_product_by_id",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id.to_string()),
            ],
        );

        match self.query.find_by_id(id).await {
            Ok(Some(product)) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Product retrieved");
                Ok(ApiResponse {
                    status: "success".into(),
                    message: "Product retrieved successfully".into(),
                    data: product.into(),
                })
            }
            Ok(None) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Product not found");
                Err(ServiceError::NotFound(format!("Product {id} not found")))
            }
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch product");
                Err(err.into())
            }
        }
    }
}
