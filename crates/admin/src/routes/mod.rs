//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Health check
//!
//! # Catalog (bearer token required)
//! GET    /api/catalog?q=&category=            - Search records
//! POST   /api/catalog/{category}              - Create a record
//! GET    /api/catalog/{category}/{id}         - Show a record
//! PUT    /api/catalog/{category}/{id}         - Replace editable fields
//! PATCH  /api/catalog/{category}/{id}/status  - Change publication status
//! DELETE /api/catalog/{category}/{id}         - Delete a record
//! ```

pub mod catalog;

use std::time::Duration;

use axum::{
    Router,
    http::{Request, Response},
    routing::{get, patch, post},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Create the catalog API router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::list))
        .route("/{category}", post(catalog::create))
        .route(
            "/{category}/{id}",
            get(catalog::show)
                .put(catalog::update)
                .delete(catalog::delete),
        )
        .route("/{category}/{id}/status", patch(catalog::set_status))
}

/// The complete admin application, minus the Sentry layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/catalog", catalog_routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
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
