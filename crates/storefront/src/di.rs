use crate::{
    abstract_trait::{
        cart::{DynCartQueryRepository, DynCartService},
        category::{DynCategoryCommandRepository, DynCategoryQueryRepository, DynCategoryService},
        checkout::DynCheckoutService,
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::{DynOrderCommandService, DynOrderQueryService},
        },
        product::{
            repository::{DynProductCommandRepository, DynProductQueryRepository},
            service::{DynProductCommandService, DynProductQueryService},
        },
        unit_of_work::DynUnitOfWorkFactory,
    },
    config::myconfig::CheckoutConfig,
    repository::{memory, postgres},
    service::{
        cart::{CartService, CartServiceDeps},
        category::{CategoryService, CategoryServiceDeps},
        checkout::{CheckoutService, CheckoutServiceDeps},
        inventory::{InventoryLedger, ReservePolicy},
        order::{OrderCommandService, OrderCommandServiceDeps, OrderQueryService},
        product::{ProductCommandService, ProductCommandServiceDeps, ProductQueryService},
    },
};
use prometheus_client::registry::Registry;
use shared::config::ConnectionPool;
use std::{fmt, sync::Arc, time::Duration};

/// Storage seams shared by every service, backed by one store.
#[derive(Clone)]
pub struct Repositories {
    pub category_query: DynCategoryQueryRepository,
    pub category_command: DynCategoryCommandRepository,
    pub product_query: DynProductQueryRepository,
    pub product_command: DynProductCommandRepository,
    pub cart_query: DynCartQueryRepository,
    pub order_query: DynOrderQueryRepository,
    pub order_command: DynOrderCommandRepository,
    pub uow: DynUnitOfWorkFactory,
}

impl Repositories {
    pub fn postgres(pool: ConnectionPool, lock_timeout: Duration) -> Self {
        Self {
            category_query: Arc::new(postgres::CategoryQueryRepository::new(pool.clone())),
            category_command: Arc::new(postgres::CategoryCommandRepository::new(pool.clone())),
            product_query: Arc::new(postgres::ProductQueryRepository::new(pool.clone())),
            product_command: Arc::new(postgres::ProductCommandRepository::new(pool.clone())),
            cart_query: Arc::new(postgres::CartQueryRepository::new(pool.clone())),
            order_query: Arc::new(postgres::OrderQueryRepository::new(pool.clone())),
            order_command: Arc::new(postgres::OrderCommandRepository::new(pool.clone())),
            uow: Arc::new(postgres::PgUnitOfWorkFactory::new(pool, lock_timeout)),
        }
    }

    pub fn memory(db: Arc<memory::MemoryDatabase>) -> Self {
        Self {
            category_query: Arc::new(memory::MemoryCategoryQueryRepository::new(db.clone())),
            category_command: Arc::new(memory::MemoryCategoryCommandRepository::new(db.clone())),
            product_query: Arc::new(memory::MemoryProductQueryRepository::new(db.clone())),
            product_command: Arc::new(memory::MemoryProductCommandRepository::new(db.clone())),
            cart_query: Arc::new(memory::MemoryCartQueryRepository::new(db.clone())),
            order_query: Arc::new(memory::MemoryOrderQueryRepository::new(db.clone())),
            order_command: Arc::new(memory::MemoryOrderCommandRepository::new(db.clone())),
            uow: Arc::new(memory::MemoryUnitOfWorkFactory::new(db)),
        }
    }
}

#[derive(Clone)]
pub struct DependenciesInject {
    pub category_service: DynCategoryService,
    pub product_query: DynProductQueryService,
    pub product_command: DynProductCommandService,
    pub cart_service: DynCartService,
    pub checkout_service: DynCheckoutService,
    pub order_query: DynOrderQueryService,
    pub order_command: DynOrderCommandService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("category_service", &"CategoryService")
            .field("product_query", &"ProductQueryService")
            .field("product_command", &"ProductCommandService")
            .field("cart_service", &"CartService")
            .field("checkout_service", &"CheckoutService")
            .field("order_query", &"OrderQueryService")
            .field("order_command", &"OrderCommandService")
            .finish()
    }
}

impl DependenciesInject {
    pub fn new(repos: Repositories, checkout: CheckoutConfig, registry: &mut Registry) -> Self {
        let Repositories {
            category_query,
            category_command,
            product_query,
            product_command,
            cart_query,
            order_query,
            order_command,
            uow,
        } = repos;

        let category_service = CategoryService::new(
            CategoryServiceDeps {
                query: category_query.clone(),
                command: category_command,
                product_query: product_query.clone(),
            },
            registry,
        );

        let product_query_service = ProductQueryService::new(product_query.clone(), registry);

        let product_command_service = ProductCommandService::new(
            ProductCommandServiceDeps {
                query: product_query,
                command: product_command,
                category_query,
            },
            registry,
        );

        let cart_service = CartService::new(
            CartServiceDeps {
                query: cart_query,
                uow: uow.clone(),
            },
            registry,
        );

        let ledger = InventoryLedger::new(
            ReservePolicy {
                max_attempts: checkout.max_reserve_attempts,
                base_delay: checkout.retry_base_delay,
            },
            registry,
        );

        let checkout_service = CheckoutService::new(CheckoutServiceDeps { uow, ledger }, registry);

        let order_query_service = OrderQueryService::new(order_query.clone(), registry);

        let order_command_service = OrderCommandService::new(
            OrderCommandServiceDeps {
                query: order_query,
                command: order_command,
            },
            registry,
        );

        Self {
            category_service: Arc::new(category_service),
            product_query: Arc::new(product_query_service),
            product_command: Arc::new(product_command_service),
            cart_service: Arc::new(cart_service),
            checkout_service: Arc::new(checkout_service),
            order_query: Arc::new(order_query_service),
            order_command: Arc::new(order_command_service),
        }
    }
}
