mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{ADDRESS, TestApp, config_with, token_for};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use storefront::handler::AppRouter;
use testresult::TestResult;
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

fn get(uri: &str, user: Option<&str>) -> TestResult<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
    }
    Ok(builder.body(Body::empty())?)
}

fn with_json(method: &str, uri: &str, user: &str, body: Value) -> TestResult<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

fn delete(uri: &str, user: &str) -> TestResult<Request<Body>> {
    Ok(Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)))
        .body(Body::empty())?)
}

async fn stocked_app(overrides: &[(&str, &str)], stock: i32) -> (Router, i32) {
    let app = TestApp::with_config(config_with(overrides));
    let category = app.category("Shampoos").await;
    let product = app.product(category, "Curl Shampoo", dec!(24.99), stock).await;
    (AppRouter::build(app.state), product)
}

#[tokio::test]
async fn catalog_reads_are_public() -> TestResult {
    let (app, product) = stocked_app(&[], 5).await;

    let (status, body) = send(&app, get("/api/products", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"][0]["name"], "Curl Shampoo");
    assert_eq!(body["data"][0]["price"], "24.99");

    let (status, body) = send(&app, get(&format!("/api/products/{product}"), None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category_name"], "Shampoos");

    let (status, _) = send(&app, get("/api/categories", None)?).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/products/999", None)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");

    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() -> TestResult {
    let (app, _) = stocked_app(&[], 5).await;

    let (status, body) = send(&app, get("/api/cart", None)?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "fail");

    let forged = Request::builder()
        .uri("/api/orders")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())?;
    let (status, body) = send(&app, forged).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");

    let create = Request::builder()
        .method("POST")
        .uri("/api/categories")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "Oils" }).to_string()))?;
    let (status, _) = send(&app, create).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = Request::builder()
        .uri("/api/cart")
        .header(header::COOKIE, format!("token={}", token_for("alice")))
        .body(Body::empty())?;
    let (status, body) = send(&app, cookie).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_id"], "alice");

    Ok(())
}

#[tokio::test]
async fn cart_to_order_over_http() -> TestResult {
    let (app, product) = stocked_app(&[], 5).await;

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/api/cart/items",
            "alice",
            json!({ "product_id": product, "quantity": 2 }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_amount"], "49.98");

    let (status, body) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/cart/items/{product}"),
            "alice",
            json!({ "quantity": 3 }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["quantity"], 3);

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/api/orders",
            "alice",
            json!({ "shipping_address": ADDRESS }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "Pending");
    assert_eq!(body["data"]["total_amount"], "74.97");
    let order_id = body["data"]["id"].as_i64().ok_or("order id")?;

    let (status, body) = send(&app, get("/api/orders", Some("alice"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], order_id);

    let (status, body) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/orders/{order_id}/status"),
            "alice",
            json!({ "status": "Paid" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Paid");

    let (status, body) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/orders/{order_id}/status"),
            "alice",
            json!({ "status": "Pending" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot change order status from Paid to Pending");

    let (status, body) = send(&app, get("/api/cart", Some("alice"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));

    Ok(())
}

#[tokio::test]
async fn checkout_failures_map_to_client_errors() -> TestResult {
    let (app, product) = stocked_app(&[], 2).await;

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/api/orders",
            "bob",
            json!({ "shipping_address": ADDRESS }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cart is empty");

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/api/orders",
            "bob",
            json!({ "shipping_address": "tiny" }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "shipping_address must be between 10 and 500 characters"
    );

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/api/cart/items",
            "bob",
            json!({ "product_id": product, "quantity": 3 }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["items"][0]["product_id"], product);
    assert_eq!(body["items"][0]["available"], 2);
    assert_eq!(body["items"][0]["requested"], 3);

    let (status, _) = send(
        &app,
        with_json(
            "POST",
            "/api/cart/items",
            "bob",
            json!({ "product_id": product, "quantity": 0 }),
        )?,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn clearing_the_cart_returns_no_content() -> TestResult {
    let (app, product) = stocked_app(&[], 5).await;

    send(
        &app,
        with_json(
            "POST",
            "/api/cart/items",
            "carol",
            json!({ "product_id": product, "quantity": 1 }),
        )?,
    )
    .await?;

    let (status, body) = send(&app, delete("/api/cart", "carol")?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, delete("/api/cart", "carol")?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, delete(&format!("/api/cart/items/{product}"), "carol")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

async fn foreign_order_status(overrides: &[(&str, &str)]) -> TestResult<StatusCode> {
    let (app, product) = stocked_app(overrides, 5).await;

    send(
        &app,
        with_json(
            "POST",
            "/api/cart/items",
            "dave",
            json!({ "product_id": product, "quantity": 1 }),
        )?,
    )
    .await?;
    let (_, body) = send(
        &app,
        with_json(
            "POST",
            "/api/orders",
            "dave",
            json!({ "shipping_address": ADDRESS }),
        )?,
    )
    .await?;
    let order_id = body["data"]["id"].as_i64().ok_or("order id")?;

    let (status, _) = send(&app, get(&format!("/api/orders/{order_id}"), Some("mallory"))?).await?;
    Ok(status)
}

#[tokio::test]
async fn foreign_orders_are_forbidden_unless_masked() -> TestResult {
    assert_eq!(foreign_order_status(&[]).await?, StatusCode::FORBIDDEN);
    assert_eq!(
        foreign_order_status(&[("MASK_FORBIDDEN_ORDERS", "true")]).await?,
        StatusCode::NOT_FOUND
    );

    Ok(())
}

#[tokio::test]
async fn metrics_and_openapi_are_served() -> TestResult {
    let (app, _) = stocked_app(&[], 5).await;

    let response = app.clone().oneshot(get("/metrics", None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/openmetrics-text"));
    let text = String::from_utf8(to_bytes(response.into_body(), usize::MAX).await?.to_vec())?;
    assert!(text.contains("checkout_outcomes"));
    assert!(text.contains("inventory_reservation_retries"));

    let (status, body) = send(&app, get("/api-docs/openapi.json", None)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/orders"].is_object());
    for path in ["/api/products/{id}", "/api/categories/{id}"] {
        let deleted = &body["paths"][path]["delete"]["responses"]["200"];
        assert!(deleted["content"]["application/json"].is_object(), "{path}");
    }
    assert!(body["components"]["securitySchemes"]["bearer_auth"].is_object());

    Ok(())
}
