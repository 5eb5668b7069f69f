//! Admin catalog API flow.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use brightwire_integration_tests::AdminClient;
use serde_json::json;

#[tokio::test]
async fn test_requires_bearer_token() {
    let anonymous = AdminClient::new().with_token(None);
    let response = anonymous.request(Method::GET, "/api/catalog", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let wrong = AdminClient::new().with_token(Some("not-the-token"));
    let response = wrong
        .request(Method::DELETE, "/api/catalog/service/1", None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Health stays public.
    let response = anonymous.request(Method::GET, "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_search_combines_filters() {
    let admin = AdminClient::new();

    let all = admin.request(Method::GET, "/api/catalog", None).await;
    assert_eq!(all.status, StatusCode::OK);
    let all = all.json();
    assert_eq!(all.as_array().unwrap().len(), 9);
    assert_eq!(all[0]["status"], "active");
    assert_eq!(all[0]["category"], "service");
    assert!(!all[0]["useCase"].as_str().unwrap().is_empty());

    let bundles = admin
        .request(Method::GET, "/api/catalog?q=landing&category=bundle", None)
        .await
        .json();
    let titles: Vec<_> = bundles
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Launch Bundle", "Growth Bundle"]);
}

#[tokio::test]
async fn test_record_lifecycle() {
    let admin = AdminClient::new();

    let created = admin
        .request(
            Method::POST,
            "/api/catalog/product",
            Some(json!({"title": "Icon Set", "price": "$29", "useCase": "Dashboards"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let created = created.json();
    assert_eq!(created["id"], 3);
    assert_eq!(created["status"], "active");

    let updated = admin
        .request(
            Method::PUT,
            "/api/catalog/product/3",
            Some(json!({"title": "Icon Set Pro", "price": "$39"})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["title"], "Icon Set Pro");

    let archived = admin
        .request(
            Method::PATCH,
            "/api/catalog/product/3/status",
            Some(json!({"status": "archived"})),
        )
        .await;
    assert_eq!(archived.status, StatusCode::OK);
    assert_eq!(archived.json()["status"], "archived");

    let shown = admin
        .request(Method::GET, "/api/catalog/product/3", None)
        .await
        .json();
    assert_eq!(shown["title"], "Icon Set Pro");
    assert_eq!(shown["price"], "$39");
    assert_eq!(shown["status"], "archived");

    let deleted = admin
        .request(Method::DELETE, "/api/catalog/product/3", None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = admin
        .request(Method::GET, "/api/catalog/product/3", None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_title_is_unprocessable() {
    let admin = AdminClient::new();
    let response = admin
        .request(
            Method::POST,
            "/api/catalog/service",
            Some(json!({"title": " ", "price": "$10"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let admin = AdminClient::new();
    let response = admin
        .request(
            Method::PATCH,
            "/api/catalog/bundle/42/status",
            Some(json!({"status": "draft"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
