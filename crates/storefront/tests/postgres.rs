#![cfg(feature = "docker-tests")]

mod common;

use common::{JWT_SECRET, add, config_with, order_request};
use rust_decimal_macros::dec;
use shared::{
    abstract_trait::DynJwtService,
    config::{ConnectionManager, JwtConfig},
    errors::ServiceError,
};
use std::{sync::Arc, time::Duration};
use storefront::{
    abstract_trait::{
        cart::CartServiceTrait,
        category::CategoryCommandRepositoryTrait,
        checkout::CheckoutServiceTrait,
        order::service::OrderCommandServiceTrait,
        product::repository::{ProductCommandRepositoryTrait, ProductQueryRepositoryTrait},
    },
    di::Repositories,
    domain::requests::{
        category::CreateCategoryRequest, order::UpdateOrderStatusRequest,
        product::CreateProductRequest,
    },
    repository::postgres::run_migrations,
    seed::seed_catalog,
    state::AppState,
};
use testcontainers_modules::{postgres::Postgres, testcontainers::runners::AsyncRunner};
use testresult::TestResult;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_store_honours_checkout_rules() -> TestResult {
    let container = Postgres::default().start().await?;
    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");

    let pool = ConnectionManager::new_pool(&url, 1, 10).await?;
    run_migrations(&pool).await?;

    let repos = Repositories::postgres(pool, Duration::from_secs(2));
    let config = config_with(&[]);
    let jwt = Arc::new(JwtConfig::new(JWT_SECRET)) as DynJwtService;
    let state = AppState::from_repositories(repos.clone(), &config, jwt);

    assert!(seed_catalog(&repos).await?);
    assert!(!seed_catalog(&repos).await?);

    let category = repos
        .category_command
        .create_category(&CreateCategoryRequest {
            name: "Limited".into(),
            description: None,
        })
        .await?;
    let scarce = repos
        .product_command
        .create_product(&CreateProductRequest {
            name: "Limited Edition Oil".into(),
            description: None,
            price: dec!(45.00),
            stock: 2,
            image_url: None,
            category_id: category.category_id,
        })
        .await?
        .product_id;

    let buyers: Vec<String> = (0..5).map(|n| format!("pg-buyer-{n}")).collect();
    for buyer in &buyers {
        state
            .di_container
            .cart_service
            .add_item(buyer, &add(scarce, 1))
            .await?;
    }

    let mut handles = Vec::new();
    for buyer in buyers {
        let checkout = state.di_container.checkout_service.clone();
        handles.push(tokio::spawn(async move {
            checkout
                .place_order(&buyer, &order_request())
                .await
                .map(|placed| (buyer, placed.data.id))
        }));
    }

    let mut placed = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(order) => placed.push(order),
            Err(ServiceError::InsufficientStock(_)) | Err(ServiceError::Conflict(_)) => {}
            Err(other) => panic!("unexpected checkout failure: {other}"),
        }
    }
    assert_eq!(placed.len(), 2);

    let remaining = repos
        .product_query
        .find_by_id(scarce)
        .await?
        .ok_or("product should exist")?
        .product
        .stock;
    assert_eq!(remaining, 0);

    let (owner, order_id) = placed[0].clone();
    let orders = &state.di_container.order_command;
    orders
        .update_status(
            &owner,
            order_id,
            &UpdateOrderStatusRequest {
                status: "Paid".into(),
            },
        )
        .await?;
    let backwards = orders
        .update_status(
            &owner,
            order_id,
            &UpdateOrderStatusRequest {
                status: "Pending".into(),
            },
        )
        .await;
    assert!(matches!(
        backwards,
        Err(ServiceError::InvalidTransition { .. })
    ));

    Ok(())
}
