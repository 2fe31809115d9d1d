use super::settle;
use crate::{
    abstract_trait::{
        cart::{CartServiceTrait, DynCartQueryRepository},
        unit_of_work::{DynUnitOfWorkFactory, UnitOfWorkTrait},
    },
    domain::{
        requests::cart::{AddCartItemRequest, UpdateCartItemRequest},
        response::cart::CartResponse,
    },
    model::{
        cart::{Cart as CartModel, amount_too_large, line_amount},
        product::Product as ProductModel,
    },
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::responses::ApiResponse,
    errors::ServiceError,
    utils::{Method, ServiceTracer, TracingContext},
};
use tracing::info;

fn require_positive(quantity: i32) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::validation("Quantity must be at least 1"));
    }
    Ok(())
}

fn require_stock(product: &ProductModel, quantity: i32) -> Result<(), ServiceError> {
    if quantity > product.stock {
        return Err(ServiceError::insufficient(
            product.product_id,
            product.name.clone(),
            quantity,
            product.stock,
        ));
    }
    line_amount(product.price, quantity).ok_or_else(amount_too_large)?;
    Ok(())
}

async fn require_product(
    uow: &mut dyn UnitOfWorkTrait,
    product_id: i32,
) -> Result<ProductModel, ServiceError> {
    uow.find_product(product_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {product_id} not found")))
}

async fn require_cart(
    uow: &mut dyn UnitOfWorkTrait,
    user_id: &str,
) -> Result<CartModel, ServiceError> {
    uow.lock_cart(user_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Cart of user {user_id} not found")))
}

async fn view(
    uow: &mut dyn UnitOfWorkTrait,
    cart: &CartModel,
) -> Result<CartResponse, ServiceError> {
    let lines = uow.cart_lines(cart.cart_id).await?;
    CartResponse::from_lines(cart.cart_id, &cart.user_id, &lines)
}

/// Carts keyed by user. Every mutation locks the cart row inside a unit of
/// work and checks the requested quantity against current stock, without
/// reserving it.
#[derive(Clone)]
pub struct CartService {
    query: DynCartQueryRepository,
    uow: DynUnitOfWorkFactory,
    tracer: ServiceTracer,
}

pub struct CartServiceDeps {
    pub query: DynCartQueryRepository,
    pub uow: DynUnitOfWorkFactory,
}

impl CartService {
    pub fn new(deps: CartServiceDeps, registry: &mut Registry) -> Self {
        let CartServiceDeps { query, uow } = deps;

        Self {
            query,
            uow,
            tracer: ServiceTracer::new("cart-service", registry),
        }
    }

    fn finish<T>(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        result: Result<T, ServiceError>,
        message: &str,
    ) -> Result<ApiResponse<T>, ServiceError> {
        match result {
            Ok(data) => {
                self.tracer.complete_success(tracing_ctx, method, message);
                Ok(ApiResponse {
                    status: "success".into(),
                    message: message.into(),
                    data,
                })
            }
            Err(err) => {
                self.tracer
                    .complete_error(tracing_ctx, method, &err.to_string());
                Err(err)
            }
        }
    }

    async fn add_line(
        &self,
        user_id: &str,
        req: &AddCartItemRequest,
    ) -> Result<CartResponse, ServiceError> {
        require_positive(req.quantity)?;

        let mut uow = self.uow.begin().await?;
        let outcome = async {
            let cart = uow.lock_or_create_cart(user_id).await?;
            let product = require_product(&mut *uow, req.product_id).await?;

            let existing = uow
                .cart_lines(cart.cart_id)
                .await?
                .into_iter()
                .find(|line| line.product_id == req.product_id)
                .map_or(0, |line| line.quantity);
            let quantity = existing.checked_add(req.quantity).ok_or_else(|| {
                ServiceError::validation(format!(
                    "Quantity of product {} in the cart would exceed {}",
                    req.product_id,
                    i32::MAX
                ))
            })?;
            require_stock(&product, quantity)?;

            uow.upsert_cart_line(cart.cart_id, req.product_id, quantity)
                .await?;
            view(&mut *uow, &cart).await
        }
        .await;

        settle(uow, outcome).await
    }

    async fn set_line(
        &self,
        user_id: &str,
        product_id: i32,
        quantity: i32,
    ) -> Result<CartResponse, ServiceError> {
        require_positive(quantity)?;

        let mut uow = self.uow.begin().await?;
        let outcome = async {
            let cart = require_cart(&mut *uow, user_id).await?;

            let in_cart = uow
                .cart_lines(cart.cart_id)
                .await?
                .iter()
                .any(|line| line.product_id == product_id);
            if !in_cart {
                return Err(ServiceError::NotFound(format!(
                    "Product {product_id} is not in the cart"
                )));
            }

            let product = require_product(&mut *uow, product_id).await?;
            require_stock(&product, quantity)?;

            uow.upsert_cart_line(cart.cart_id, product_id, quantity)
                .await?;
            view(&mut *uow, &cart).await
        }
        .await;

        settle(uow, outcome).await
    }

    async fn remove_line(
        &self,
        user_id: &str,
        product_id: i32,
    ) -> Result<CartResponse, ServiceError> {
        let mut uow = self.uow.begin().await?;
        let outcome = async {
            let cart = require_cart(&mut *uow, user_id).await?;

            if !uow.delete_cart_line(cart.cart_id, product_id).await? {
                return Err(ServiceError::NotFound(format!(
                    "Product {product_id} is not in the cart"
                )));
            }

            view(&mut *uow, &cart).await
        }
        .await;

        settle(uow, outcome).await
    }

    async fn clear(&self, user_id: &str) -> Result<(), ServiceError> {
        let mut uow = self.uow.begin().await?;
        let outcome = async {
            if let Some(cart) = uow.lock_cart(user_id).await? {
                let removed = uow.clear_cart(cart.cart_id).await?;
                info!("🗑️ Cleared {removed} line(s) from cart {}", cart.cart_id);
            }
            Ok::<_, ServiceError>(())
        }
        .await;

        settle(uow, outcome).await
    }
}

#[async_trait]
impl CartServiceTrait for CartService {
    async fn get_cart(&self, user_id: &str) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracer.start(
            "get_cart",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("cart.user_id", user_id.to_string()),
            ],
        );

        let result = async {
            match self.query.find_by_user(user_id).await? {
                Some(cart) => {
                    let lines = self.query.find_lines(cart.cart_id).await?;
                    CartResponse::from_lines(cart.cart_id, user_id, &lines)
                }
                None => Ok(CartResponse::empty(user_id)),
            }
        }
        .await;

        self.finish(&tracing_ctx, method, result, "Cart retrieved successfully")
    }

    async fn get_or_create_cart(
        &self,
        user_id: &str,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "get_or_create_cart",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("cart.user_id", user_id.to_string()),
            ],
        );

        let result = async {
            let mut uow = self.uow.begin().await?;
            let outcome = async {
                let cart = uow.lock_or_create_cart(user_id).await?;
                view(&mut *uow, &cart).await
            }
            .await;
            settle(uow, outcome).await
        }
        .await;

        self.finish(&tracing_ctx, method, result, "Cart retrieved successfully")
    }

    async fn add_item(
        &self,
        user_id: &str,
        req: &AddCartItemRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracer.start(
            "add_cart_item",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("cart.user_id", user_id.to_string()),
                KeyValue::new("product.id", req.product_id.to_string()),
                KeyValue::new("quantity", req.quantity.to_string()),
            ],
        );

        let result = self.add_line(user_id, req).await;
        self.finish(&tracing_ctx, method, result, "Item added to cart")
    }

    async fn update_item(
        &self,
        user_id: &str,
        product_id: i32,
        req: &UpdateCartItemRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracer.start(
            "update_cart_item",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("cart.user_id", user_id.to_string()),
                KeyValue::new("product.id", product_id.to_string()),
                KeyValue::new("quantity", req.quantity.to_string()),
            ],
        );

        let result = self.set_line(user_id, product_id, req.quantity).await;
        self.finish(&tracing_ctx, method, result, "Cart item updated")
    }

    async fn remove_item(
        &self,
        user_id: &str,
        product_id: i32,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "remove_cart_item",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("cart.user_id", user_id.to_string()),
                KeyValue::new("product.id", product_id.to_string()),
            ],
        );

        let result = self.remove_line(user_id, product_id).await;
        self.finish(&tracing_ctx, method, result, "Item removed from cart")
    }

    async fn clear_cart(&self, user_id: &str) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.tracer.start(
            "clear_cart",
            vec![
                KeyValue::new("component", "cart"),
                KeyValue::new("cart.user_id", user_id.to_string()),
            ],
        );

        let result = self.clear(user_id).await;
        self.finish(&tracing_ctx, method, result, "Cart cleared")
    }
}
