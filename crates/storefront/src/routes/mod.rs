//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Health check
//!
//! # Catalog
//! GET  /catalog                   - All offerings by category
//! GET  /catalog/{category}        - Offerings in one category
//!
//! # Cart (session-scoped)
//! GET  /cart                      - Items, count and totals
//! GET  /cart/count                - Count badge
//! POST /cart/add                  - Add one unit of an offering
//! POST /cart/update               - Set a line's quantity
//! POST /cart/remove               - Remove a line
//! POST /cart/clear                - Empty the cart
//!
//! # Checkout
//! POST /checkout                  - Place an order, returns order + receipt
//! GET  /orders/{id}/receipt       - Plain-text receipt
//!
//! # Verification
//! POST /verification/request      - Issue a token, email the code
//! POST /verification/confirm      - Check a code
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod verification;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    routing::{get, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{category}", get(catalog::category))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the verification routes router.
pub fn verification_routes() -> Router<AppState> {
    Router::new()
        .route("/request", post(verification::request_code))
        .route("/confirm", post(verification::confirm_code))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/catalog", catalog_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .route("/orders/{id}/receipt", get(checkout::receipt))
        .nest("/verification", verification_routes())
}

/// The complete storefront application, minus the Sentry layers.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
