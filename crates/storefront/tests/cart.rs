mod common;

use common::{TestApp, add};
use rust_decimal_macros::dec;
use shared::errors::ServiceError;
use storefront::{
    abstract_trait::cart::CartServiceTrait, domain::requests::cart::UpdateCartItemRequest,
    model::cart::MAX_AMOUNT,
};
use testresult::TestResult;

#[tokio::test]
async fn user_without_cart_sees_empty_view() -> TestResult {
    let app = TestApp::new();

    let cart = app.state.di_container.cart_service.get_cart("nobody").await?.data;

    assert_eq!(cart.id, None);
    assert_eq!(cart.user_id, "nobody");
    assert!(cart.items.is_empty());
    assert_eq!(cart.total_amount, dec!(0));

    Ok(())
}

#[tokio::test]
async fn get_or_create_returns_the_same_cart() -> TestResult {
    let app = TestApp::new();
    let carts = &app.state.di_container.cart_service;

    let first = carts.get_or_create_cart("alice").await?.data;
    let second = carts.get_or_create_cart("alice").await?.data;

    assert!(first.id.is_some());
    assert_eq!(first.id, second.id);

    Ok(())
}

#[tokio::test]
async fn adding_same_product_twice_sums_quantities() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Shampoos").await;
    let shampoo = app.product(category, "Curl Shampoo", dec!(24.99), 10).await;
    let carts = &app.state.di_container.cart_service;

    carts.add_item("alice", &add(shampoo, 2)).await?;
    let cart = carts.add_item("alice", &add(shampoo, 3)).await?.data;

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.items[0].subtotal, dec!(124.95));
    assert_eq!(cart.total_amount, dec!(124.95));

    Ok(())
}

#[tokio::test]
async fn adding_beyond_stock_is_rejected_without_change() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Shampoos").await;
    let shampoo = app.product(category, "Curl Shampoo", dec!(24.99), 4).await;
    let carts = &app.state.di_container.cart_service;

    carts.add_item("alice", &add(shampoo, 3)).await?;
    let result = carts.add_item("alice", &add(shampoo, 2)).await;

    let Err(ServiceError::InsufficientStock(lines)) = result else {
        panic!("expected insufficient stock, got {result:?}");
    };
    assert_eq!(lines[0].requested, 5);
    assert_eq!(lines[0].available, 4);

    let cart = carts.get_cart("alice").await?.data;
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(app.stock_of(shampoo).await, 4);

    Ok(())
}

#[tokio::test]
async fn invalid_quantity_and_unknown_product_are_rejected() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Tools").await;
    let comb = app.product(category, "Wide Comb", dec!(9.99), 10).await;
    let carts = &app.state.di_container.cart_service;

    let zero = carts.add_item("bob", &add(comb, 0)).await;
    assert!(matches!(zero, Err(ServiceError::Validation(_))));

    let missing = carts.add_item("bob", &add(9999, 1)).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    let cart = carts.get_cart("bob").await?.data;
    assert!(cart.items.is_empty());

    Ok(())
}

#[tokio::test]
async fn update_sets_quantity_of_existing_line_only() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Conditioners").await;
    let spray = app.product(category, "Leave-In Spray", dec!(19.99), 6).await;
    let cream = app.product(category, "Rinse Cream", dec!(15.00), 6).await;
    let carts = &app.state.di_container.cart_service;

    carts.add_item("carol", &add(spray, 1)).await?;

    let cart = carts
        .update_item("carol", spray, &UpdateCartItemRequest { quantity: 4 })
        .await?
        .data;
    assert_eq!(cart.items[0].quantity, 4);

    let too_many = carts
        .update_item("carol", spray, &UpdateCartItemRequest { quantity: 7 })
        .await;
    assert!(matches!(too_many, Err(ServiceError::InsufficientStock(_))));

    let not_in_cart = carts
        .update_item("carol", cream, &UpdateCartItemRequest { quantity: 1 })
        .await;
    assert!(matches!(not_in_cart, Err(ServiceError::NotFound(_))));

    let no_cart = carts
        .update_item("dave", spray, &UpdateCartItemRequest { quantity: 1 })
        .await;
    assert!(matches!(no_cart, Err(ServiceError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn remove_and_clear_lines() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Styling").await;
    let gel = app.product(category, "Curl Gel", dec!(18.50), 5).await;
    let mousse = app.product(category, "Mousse", dec!(14.00), 5).await;
    let carts = &app.state.di_container.cart_service;

    carts.add_item("erin", &add(gel, 1)).await?;
    carts.add_item("erin", &add(mousse, 2)).await?;

    let cart = carts.remove_item("erin", gel).await?.data;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product_id, mousse);
    assert_eq!(cart.total_amount, dec!(28.00));

    let again = carts.remove_item("erin", gel).await;
    assert!(matches!(again, Err(ServiceError::NotFound(_))));

    carts.clear_cart("erin").await?;
    assert!(carts.get_cart("erin").await?.data.items.is_empty());

    // clearing twice, or a cart that never existed, is fine
    carts.clear_cart("erin").await?;
    carts.clear_cart("stranger").await?;

    Ok(())
}

#[tokio::test]
async fn carts_are_isolated_per_user() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Treatments").await;
    let mask = app.product(category, "Hair Mask", dec!(32.00), 10).await;
    let carts = &app.state.di_container.cart_service;

    carts.add_item("alice", &add(mask, 2)).await?;
    carts.add_item("bob", &add(mask, 1)).await?;

    let alice = carts.get_cart("alice").await?.data;
    let bob = carts.get_cart("bob").await?.data;

    assert_ne!(alice.id, bob.id);
    assert_eq!(alice.items[0].quantity, 2);
    assert_eq!(bob.items[0].quantity, 1);

    Ok(())
}

#[tokio::test]
async fn quantity_sum_past_i32_max_is_rejected() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Bulk").await;
    let pins = app.product(category, "Bobby Pins", dec!(1.00), i32::MAX).await;
    let carts = &app.state.di_container.cart_service;

    let cart = carts.add_item("kim", &add(pins, i32::MAX)).await?.data;
    assert_eq!(cart.total_amount, dec!(2147483647.00));

    let result = carts.add_item("kim", &add(pins, 1)).await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));

    let cart = carts.get_cart("kim").await?.data;
    assert_eq!(cart.items[0].quantity, i32::MAX);

    Ok(())
}

#[tokio::test]
async fn line_subtotal_past_the_amount_column_is_rejected() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Collectibles").await;
    let comb = app.product(category, "Gold Comb", MAX_AMOUNT, 10).await;
    let carts = &app.state.di_container.cart_service;

    let cart = carts.add_item("lena", &add(comb, 1)).await?.data;
    assert_eq!(cart.items[0].subtotal, MAX_AMOUNT);
    assert_eq!(cart.total_amount, MAX_AMOUNT);

    let doubled = carts
        .update_item("lena", comb, &UpdateCartItemRequest { quantity: 2 })
        .await;
    assert!(matches!(doubled, Err(ServiceError::Validation(_))));

    let more = carts.add_item("lena", &add(comb, 1)).await;
    assert!(matches!(more, Err(ServiceError::Validation(_))));

    let cart = carts.get_cart("lena").await?.data;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 1);

    Ok(())
}

#[tokio::test]
async fn cart_total_past_the_amount_column_leaves_cart_unchanged() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Collectibles").await;
    let comb = app.product(category, "Gold Comb", MAX_AMOUNT, 10).await;
    let clip = app.product(category, "Hair Clip", dec!(1.00), 10).await;
    let carts = &app.state.di_container.cart_service;

    carts.add_item("milo", &add(comb, 1)).await?;
    let result = carts.add_item("milo", &add(clip, 1)).await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));

    let cart = carts.get_cart("milo").await?.data;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product_id, comb);
    assert_eq!(cart.total_amount, MAX_AMOUNT);

    Ok(())
}
