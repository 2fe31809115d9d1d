use crate::{
    abstract_trait::order::{repository::DynOrderQueryRepository, service::OrderQueryServiceTrait},
    domain::response::order::OrderResponse,
    model::order::{Order as OrderModel, OrderItem as OrderItemModel},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::responses::ApiResponse,
    errors::ServiceError,
    utils::{Method, ServiceTracer},
};
use std::collections::HashMap;
use tracing::warn;

/// Loads the order and rejects requesters other than its owner.
pub(crate) async fn find_owned(
    query: &DynOrderQueryRepository,
    requester: &str,
    id: i32,
) -> Result<OrderModel, ServiceError> {
    let order = query
        .find_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {id} not found")))?;

    if order.user_id != requester {
        warn!("⚠️ User {requester} tried to access order {id} of another user");
        return Err(ServiceError::Forbidden(format!(
            "Order {id} belongs to another user"
        )));
    }

    Ok(order)
}

#[derive(Clone)]
pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    tracer: ServiceTracer,
}

impl OrderQueryService {
    pub fn new(query: DynOrderQueryRepository, registry: &mut Registry) -> Self {
        Self {
            query,
            tracer: ServiceTracer::new("order-query-service", registry),
        }
    }

    async fn with_items(&self, orders: Vec<OrderModel>) -> Result<Vec<OrderResponse>, ServiceError> {
        let ids: Vec<i32> = orders.iter().map(|order| order.order_id).collect();

        let mut items_by_order: HashMap<i32, Vec<OrderItemModel>> = HashMap::new();
        for item in self.query.find_items(&ids).await? {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.order_id).unwrap_or_default();
                OrderResponse::from_parts(order, items)
            })
            .collect())
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_by_id(
        &self,
        requester: &str,
        id: i32,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_order_by_id",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id.to_string()),
                KeyValue::new("order.requester", requester.to_string()),
            ],
        );

        let result = async {
            let order = find_owned(&self.query, requester, id).await?;
            let items = self.query.find_items(&[id]).await?;
            Ok::<_, ServiceError>(OrderResponse::from_parts(order, items))
        }
        .await;

        match result {
            Ok(order) => {
                self.tracer
                    .complete_success(&tracing_ctx, method, "Order retrieved");
                Ok(ApiResponse {
                    status: "success".into(),
                    message: "Order retrieved successfully".into(),
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

    async fn find_by_user(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "find_orders_by_user",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.user_id", user_id.to_string()),
            ],
        );

        let orders = match self.query.find_by_user(user_id).await {
            Ok(orders) => orders,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch orders");
                return Err(err.into());
            }
        };

        let data = match self.with_items(orders).await {
            Ok(data) => data,
            Err(err) => {
                self.tracer
                    .complete_error(&tracing_ctx, method, "Failed to fetch order items");
                return Err(err);
            }
        };

        self.tracer.complete_success(
            &tracing_ctx,
            method,
            &format!("Fetched {} orders", data.len()),
        );

        Ok(ApiResponse {
            status: "success".into(),
            message: "Orders retrieved successfully".into(),
            data,
        })
    }
}
