//! Storefront HTTP flow: catalog, session cart, checkout, receipts and
//! verification tokens.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use brightwire_integration_tests::StorefrontClient;
use serde_json::json;

fn audit() -> serde_json::Value {
    json!({"id": 1, "type": "service"})
}

#[tokio::test]
async fn test_health() {
    let mut client = StorefrontClient::new();
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_catalog_lists_categories() {
    let mut client = StorefrontClient::new();

    let response = client.get("/catalog").await;
    assert_eq!(response.status, StatusCode::OK);
    let catalog = response.json();
    assert_eq!(catalog["service"][0]["title"], "Website Audit");
    assert_eq!(catalog["bundle"].as_array().unwrap().len(), 2);

    let response = client.get("/catalog/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json().as_array().unwrap().len(), 2);

    let response = client.get("/catalog/gifts").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_session_sees_empty_cart() {
    let mut client = StorefrontClient::new();

    let cart = client.get("/cart").await.json();
    assert_eq!(cart["count"], 0);
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
    assert_eq!(cart["totals"]["totalWithTax"].as_f64(), Some(0.0));

    assert_eq!(client.get("/cart/count").await.json()["count"], 0);
}

#[tokio::test]
async fn test_adding_twice_merges_and_prices_with_tax() {
    let mut client = StorefrontClient::new();

    let first = client.post("/cart/add", audit()).await;
    assert_eq!(first.status, StatusCode::OK);
    let second = client.post("/cart/add", audit()).await.json();

    assert_eq!(second["changed"], true);
    let cart = &second["cart"];
    assert_eq!(cart["count"], 2);
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["items"][0]["price"].as_f64(), Some(300.0));
    assert_eq!(cart["totals"]["subtotal"].as_f64(), Some(600.0));
    assert_eq!(cart["totals"]["taxAmount"].as_f64(), Some(138.0));
    assert_eq!(cart["totals"]["totalWithTax"].as_f64(), Some(738.0));

    assert_eq!(client.get("/cart/count").await.json()["count"], 2);
}

#[tokio::test]
async fn test_sessions_have_separate_carts() {
    let mut client = StorefrontClient::new();
    client.post("/cart/add", audit()).await;
    assert_eq!(client.get("/cart/count").await.json()["count"], 1);

    client.clear_cookies();
    assert_eq!(client.get("/cart/count").await.json()["count"], 0);
}

#[tokio::test]
async fn test_adding_unknown_offering_is_not_found() {
    let mut client = StorefrontClient::new();
    let response = client
        .post("/cart/add", json!({"id": 99, "type": "service"}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_update_remove_and_clear() {
    let mut client = StorefrontClient::new();
    client.post("/cart/add", audit()).await;
    client
        .post("/cart/add", json!({"id": 2, "type": "product"}))
        .await;

    let updated = client
        .post("/cart/update", json!({"id": 1, "type": "service", "quantity": 4}))
        .await
        .json();
    assert_eq!(updated["changed"], true);
    assert_eq!(updated["cart"]["count"], 5);

    let rejected = client
        .post("/cart/update", json!({"id": 1, "type": "service", "quantity": 0}))
        .await
        .json();
    assert_eq!(rejected["changed"], false);
    assert_eq!(rejected["cart"]["count"], 5);

    let removed = client
        .post("/cart/remove", json!({"id": 2, "type": "product"}))
        .await
        .json();
    assert_eq!(removed["changed"], true);
    assert_eq!(removed["cart"]["count"], 4);

    let missing = client
        .post("/cart/remove", json!({"id": 2, "type": "product"}))
        .await
        .json();
    assert_eq!(missing["changed"], false);

    let cleared = client.post("/cart/clear", json!({})).await.json();
    assert_eq!(cleared["cart"]["count"], 0);
}

#[tokio::test]
async fn test_checkout_places_order_and_empties_cart() {
    let mut client = StorefrontClient::new();
    client.post("/cart/add", audit()).await;
    client.post("/cart/add", audit()).await;

    let response = client
        .post(
            "/checkout",
            json!({
                "customer": {"name": "Ada Lovelace", "email": "ada@example.com"},
                "paymentMethod": "card"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let body = response.json();
    let order = &body["order"];
    assert_eq!(order["total"].as_f64(), Some(738.0));
    assert_eq!(order["tax"].as_f64(), Some(138.0));
    assert_eq!(order["paymentMethod"], "card");
    let receipt = body["receipt"].as_str().unwrap();
    assert!(receipt.contains("Ada Lovelace <ada@example.com>"));
    assert!(receipt.contains("$738.00"));

    assert_eq!(client.get("/cart/count").await.json()["count"], 0);

    let order_id = order["id"].as_str().unwrap();
    let stored = client.get(&format!("/orders/{order_id}/receipt")).await;
    assert_eq!(stored.status, StatusCode::OK);
    assert_eq!(stored.text(), receipt);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart_and_blank_name() {
    let mut client = StorefrontClient::new();
    let checkout = json!({
        "customer": {"name": "Ada", "email": "ada@example.com"},
        "paymentMethod": "paypal"
    });

    let response = client.post("/checkout", checkout.clone()).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    client.post("/cart/add", audit()).await;
    let response = client
        .post(
            "/checkout",
            json!({
                "customer": {"name": "   ", "email": "ada@example.com"},
                "paymentMethod": "paypal"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // The cart is untouched by the failed attempt.
    assert_eq!(client.get("/cart/count").await.json()["count"], 1);
}

#[tokio::test]
async fn test_unknown_receipt_is_not_found() {
    let mut client = StorefrontClient::new();
    let response = client
        .get(&format!("/orders/{}/receipt", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verification_round_trip() {
    let mut client = StorefrontClient::new();

    let response = client
        .post(
            "/verification/request",
            json!({"email": "ada@example.com", "purpose": "order_confirmation"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let ticket = response.json();
    let token = ticket["token"].as_str().unwrap().to_string();
    assert!(ticket["expiresAt"].is_string());
    assert!(ticket.get("code").is_none());

    let code = client
        .state()
        .verification()
        .get(&token)
        .await
        .unwrap()
        .code;

    // Issued codes are six digits from 100000.
    let response = client
        .post("/verification/confirm", json!({"token": token, "code": "000000"}))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = client
        .post("/verification/confirm", json!({"token": token, "code": code}))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let confirmed = response.json();
    assert_eq!(confirmed["status"], "verified");
    assert_eq!(confirmed["email"], "ada@example.com");
    assert_eq!(confirmed["purpose"], "order_confirmation");

    let response = client
        .post("/verification/confirm", json!({"token": token, "code": code}))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_verification_unknown_token() {
    let mut client = StorefrontClient::new();
    let response = client
        .post(
            "/verification/confirm",
            json!({"token": "nope", "code": "123456"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let mut client = StorefrontClient::new();
    let response = client.get("/cart").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["cache-control"], "no-store");
}
