#![allow(dead_code)]

use rust_decimal::Decimal;
use shared::{
    abstract_trait::{DynJwtService, JwtServiceTrait},
    config::JwtConfig,
};
use std::{collections::HashMap, sync::Arc};
use storefront::{
    abstract_trait::{
        category::CategoryCommandRepositoryTrait,
        order::repository::OrderQueryRepositoryTrait,
        product::repository::{ProductCommandRepositoryTrait, ProductQueryRepositoryTrait},
    },
    config::myconfig::Config,
    di::Repositories,
    domain::requests::{
        cart::AddCartItemRequest, category::CreateCategoryRequest, order::CreateOrderRequest,
        product::CreateProductRequest,
    },
    repository::memory::MemoryDatabase,
    state::AppState,
};

pub const JWT_SECRET: &str = "storefront-test-secret";
pub const ADDRESS: &str = "12 Curl Street, Springfield";

pub fn config_with(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("STORE_BACKEND".to_string(), "memory".to_string()),
        ("JWT_SECRET".to_string(), JWT_SECRET.to_string()),
        ("CHECKOUT_RETRY_BASE_DELAY_MS".to_string(), "1".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    Config::from_lookup(|key| vars.get(key).cloned()).expect("test configuration is valid")
}

pub fn token_for(user_id: &str) -> String {
    JwtConfig::new(JWT_SECRET)
        .generate_token(user_id, "access")
        .expect("access token")
}

pub fn order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        shipping_address: ADDRESS.to_string(),
    }
}

pub fn add(product_id: i32, quantity: i32) -> AddCartItemRequest {
    AddCartItemRequest {
        product_id,
        quantity,
    }
}

/// Fully wired application over a fresh in-memory store.
pub struct TestApp {
    pub repos: Repositories,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(config_with(&[]))
    }

    pub fn with_config(config: Config) -> Self {
        let repos = Repositories::memory(MemoryDatabase::new(config.checkout.lock_timeout));
        let jwt = Arc::new(JwtConfig::new(JWT_SECRET)) as DynJwtService;
        let state = AppState::from_repositories(repos.clone(), &config, jwt);

        Self { repos, state }
    }

    pub async fn category(&self, name: &str) -> i32 {
        self.repos
            .category_command
            .create_category(&CreateCategoryRequest {
                name: name.to_string(),
                description: None,
            })
            .await
            .expect("category is created")
            .category_id
    }

    pub async fn product(&self, category_id: i32, name: &str, price: Decimal, stock: i32) -> i32 {
        self.repos
            .product_command
            .create_product(&CreateProductRequest {
                name: name.to_string(),
                description: None,
                price,
                stock,
                image_url: None,
                category_id,
            })
            .await
            .expect("product is created")
            .product_id
    }

    pub async fn stock_of(&self, product_id: i32) -> i32 {
        self.repos
            .product_query
            .find_by_id(product_id)
            .await
            .expect("product lookup")
            .expect("product exists")
            .product
            .stock
    }

    pub async fn orders_of(&self, user_id: &str) -> usize {
        self.repos
            .order_query
            .find_by_user(user_id)
            .await
            .expect("order lookup")
            .len()
    }
}
