mod common;

use common::{TestApp, add, order_request};
use rust_decimal_macros::dec;
use shared::errors::ServiceError;
use storefront::{
    abstract_trait::{
        cart::CartServiceTrait,
        checkout::CheckoutServiceTrait,
        order::{
            repository::OrderCommandRepositoryTrait,
            service::{OrderCommandServiceTrait, OrderQueryServiceTrait},
        },
    },
    domain::requests::order::UpdateOrderStatusRequest,
    model::order::OrderStatus,
};
use testresult::TestResult;

async fn place(app: &TestApp, user: &str, product_id: i32, quantity: i32) -> TestResult<i32> {
    app.state
        .di_container
        .cart_service
        .add_item(user, &add(product_id, quantity))
        .await?;
    let order = app
        .state
        .di_container
        .checkout_service
        .place_order(user, &order_request())
        .await?;
    Ok(order.data.id)
}

fn status(value: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: value.to_string(),
    }
}

#[tokio::test]
async fn owner_reads_order_and_others_are_forbidden() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Shampoos").await;
    let shampoo = app.product(category, "Curl Shampoo", dec!(24.99), 10).await;
    let id = place(&app, "alice", shampoo, 2).await?;

    let orders = &app.state.di_container.order_query;

    let order = orders.find_by_id("alice", id).await?.data;
    assert_eq!(order.id, id);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.total_amount, dec!(49.98));

    let foreign = orders.find_by_id("mallory", id).await;
    assert!(matches!(foreign, Err(ServiceError::Forbidden(_))));

    let missing = orders.find_by_id("alice", id + 100).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn orders_are_listed_newest_first_per_user() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Tools").await;
    let comb = app.product(category, "Wide Comb", dec!(9.99), 20).await;

    let first = place(&app, "bob", comb, 1).await?;
    let second = place(&app, "bob", comb, 2).await?;
    place(&app, "carol", comb, 1).await?;

    let listed = app
        .state
        .di_container
        .order_query
        .find_by_user("bob")
        .await?
        .data;

    let ids: Vec<i32> = listed.iter().map(|order| order.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(listed[0].items[0].quantity, 2);
    assert!(listed.iter().all(|order| order.user_id == "bob"));

    let none = app
        .state
        .di_container
        .order_query
        .find_by_user("nobody")
        .await?
        .data;
    assert!(none.is_empty());

    Ok(())
}

#[tokio::test]
async fn status_moves_forward_and_rejects_going_back() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Conditioners").await;
    let conditioner = app.product(category, "Deep Conditioner", dec!(27.99), 5).await;
    let id = place(&app, "dave", conditioner, 1).await?;
    let orders = &app.state.di_container.order_command;

    let paid = orders.update_status("dave", id, &status("Paid")).await?;
    assert_eq!(paid.data.status, OrderStatus::Paid);
    assert_eq!(paid.message, "Order status updated to Paid");

    let skipped = orders.update_status("dave", id, &status("Shipped")).await?;
    assert_eq!(skipped.data.status, OrderStatus::Shipped);

    let back = orders.update_status("dave", id, &status("Paid")).await;
    let Err(ServiceError::InvalidTransition { from, to }) = back else {
        panic!("expected invalid transition, got {back:?}");
    };
    assert_eq!(from, "Shipped");
    assert_eq!(to, "Paid");

    orders.update_status("dave", id, &status("Delivered")).await?;
    let after_terminal = orders.update_status("dave", id, &status("Cancelled")).await;
    assert!(matches!(
        after_terminal,
        Err(ServiceError::InvalidTransition { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn status_update_checks_name_owner_and_existence() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Styling").await;
    let gel = app.product(category, "Curl Gel", dec!(18.50), 5).await;
    let id = place(&app, "erin", gel, 1).await?;
    let orders = &app.state.di_container.order_command;

    let unknown = orders.update_status("erin", id, &status("Lost")).await;
    assert!(matches!(unknown, Err(ServiceError::Validation(_))));

    let foreign = orders.update_status("mallory", id, &status("Cancelled")).await;
    assert!(matches!(foreign, Err(ServiceError::Forbidden(_))));

    let missing = orders.update_status("erin", id + 50, &status("Paid")).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));

    let cancelled = orders.update_status("erin", id, &status("Cancelled")).await?;
    assert_eq!(cancelled.data.status, OrderStatus::Cancelled);

    Ok(())
}

#[tokio::test]
async fn conditional_update_misses_when_status_moved() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Treatments").await;
    let oil = app.product(category, "Hair Oil", dec!(15.00), 5).await;
    let id = place(&app, "frank", oil, 1).await?;
    let repo = &app.repos.order_command;

    let moved = repo
        .update_status(id, OrderStatus::Pending, OrderStatus::Paid)
        .await?;
    assert_eq!(moved.map(|order| order.status), Some(OrderStatus::Paid));

    let stale = repo
        .update_status(id, OrderStatus::Pending, OrderStatus::Cancelled)
        .await?;
    assert!(stale.is_none());

    let gone = repo
        .update_status(id + 10, OrderStatus::Pending, OrderStatus::Paid)
        .await?;
    assert!(gone.is_none());

    Ok(())
}

#[tokio::test]
async fn pending_order_can_ship_directly() -> TestResult {
    let app = TestApp::new();
    let category = app.category("Tools").await;
    let diffuser = app.product(category, "Diffuser", dec!(39.00), 2).await;
    let id = place(&app, "gina", diffuser, 1).await?;

    let shipped = app
        .state
        .di_container
        .order_command
        .update_status("gina", id, &status("Shipped"))
        .await?;

    assert_eq!(shipped.data.status, OrderStatus::Shipped);
    assert_eq!(shipped.data.items.len(), 1);

    Ok(())
}
