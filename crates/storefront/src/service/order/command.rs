use super::query::find_owned;
use crate::{
    abstract_trait::order::{
        repository::{DynOrderCommandRepository, DynOrderQueryRepository},
        service::OrderCommandServiceTrait,
    },
    domain::{requests::order::UpdateOrderStatusRequest, response::order::OrderResponse},
    model::order::OrderStatus,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::responses::ApiResponse,
    errors::ServiceError,
    utils::{Method, ServiceTracer},
};
use tracing::info;

#[derive(Clone)]
pub struct OrderCommandService {
    query: DynOrderQueryRepository,
    command: DynOrderCommandRepository,
    tracer: ServiceTracer,
}

pub struct OrderCommandServiceDeps {
    pub query: DynOrderQueryRepository,
    pub command: DynOrderCommandRepository,
}

impl OrderCommandService {
    pub fn new(deps: OrderCommandServiceDeps, registry: &mut Registry) -> Self {
        let OrderCommandServiceDeps { query, command } = deps;

        Self {
            query,
            command,
            tracer: ServiceTracer::new("order-command-service", registry),
        }
    }

    async fn transition(
        &self,
        requester: &str,
        id: i32,
        requested: &str,
    ) -> Result<OrderResponse, ServiceError> {
        let next: OrderStatus = requested.parse()?;
        let order = find_owned(&self.query, requester, id).await?;
        let current = order.status;

        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        let Some(updated) = self.command.update_status(id, current, next).await? else {
            // The conditional update matched nothing: the row is gone or
            // another writer moved it first.
            return match self.query.find_by_id(id).await? {
                None => Err(ServiceError::NotFound(format!("Order {id} not found"))),
                Some(latest) => Err(ServiceError::Conflict(format!(
                    "Order {id} changed to {} concurrently",
                    latest.status
                ))),
            };
        };

        info!("🔄 Order {id} moved from {current} to {next}");

        let items = self.query.find_items(&[id]).await?;
        Ok(OrderResponse::from_parts(updated, items))
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn update_status(
        &self,
        requester: &str,
        id: i32,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracer.start(
            "update_order_status",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id.to_string()),
                KeyValue::new("order.status", req.status.clone()),
            ],
        );

        match self.transition(requester, id, &req.status).await {
            Ok(order) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Order status updated");
                Ok(ApiResponse {
                    status: "success".into(),
                    message: format!("Order status updated to {}", order.status),
                    data: order,
                })
            }
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, &err.to_string());
                Err(err)
            }
        }
    }
}
