//! Integration tests for Brightwire.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p brightwire-integration-tests
//! ```
//!
//! Both applications are driven in-process through `tower::ServiceExt::oneshot`,
//! so no servers or network access are needed.
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart store and pricing against file storage
//! - `storefront_flow` - Storefront HTTP API: cart, checkout, receipts, verification
//! - `admin_catalog` - Admin catalog API

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use brightwire_admin::catalog::CatalogEditor;
use brightwire_admin::config::AdminConfig;
use brightwire_storefront::config::StorefrontConfig;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// API token used by [`AdminClient`].
pub const ADMIN_TOKEN: &str = "kT9#vB2$wQ7!mN4@xR8%pL3^zC6&hJ1*";

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let (parts, body) = response.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read response body");
    TestResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    }
}

/// The `name=value` pair of a `Set-Cookie` header, if any.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

fn build_request(method: Method, uri: &str, body: Option<&Value>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder.header(header::CONTENT_TYPE, "application/json")
    } else {
        builder
    }
}

fn into_body(body: Option<&Value>) -> Body {
    body.map_or_else(Body::empty, |value| Body::from(value.to_string()))
}

/// A shopper talking to an in-process storefront.
///
/// Keeps the session cookie between requests like a browser would.
pub struct StorefrontClient {
    app: Router,
    state: brightwire_storefront::state::AppState,
    cookie: Option<String>,
    _data_dir: TempDir,
}

impl StorefrontClient {
    /// Storefront with default pricing and a fresh data directory.
    ///
    /// # Panics
    ///
    /// Panics if application state cannot be built.
    #[must_use]
    pub fn new() -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create data dir");
        let config = StorefrontConfig::new("http://localhost:3000", data_dir.path());
        let state = brightwire_storefront::state::AppState::new(config)
            .expect("Failed to build storefront state");
        Self {
            app: brightwire_storefront::routes::app(state.clone()),
            state,
            cookie: None,
            _data_dir: data_dir,
        }
    }

    /// Shared application state, for reading what the API hides.
    #[must_use]
    pub const fn state(&self) -> &brightwire_storefront::state::AppState {
        &self.state
    }

    /// Forget the session cookie.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// Send a request with the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = build_request(method, uri, body.as_ref());
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(into_body(body.as_ref()))
            .expect("Failed to build request");

        let response = send(&self.app, request).await;
        if let Some(cookie) = session_cookie(&response.headers) {
            self.cookie = Some(cookie);
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }
}

impl Default for StorefrontClient {
    fn default() -> Self {
        Self::new()
    }
}

/// An operator talking to an in-process admin API.
pub struct AdminClient {
    app: Router,
    token: Option<String>,
}

impl AdminClient {
    /// Admin API over the built-in catalog, authenticated with [`ADMIN_TOKEN`].
    ///
    /// # Panics
    ///
    /// Panics if the built-in catalog does not parse.
    #[must_use]
    pub fn new() -> Self {
        let editor = CatalogEditor::builtin().expect("Failed to load built-in catalog");
        let state = brightwire_admin::state::AppState::new(AdminConfig::new(ADMIN_TOKEN), editor);
        Self {
            app: brightwire_admin::routes::app(state),
            token: Some(ADMIN_TOKEN.to_string()),
        }
    }

    /// Same API, different bearer token.
    #[must_use]
    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    /// Send a request with the bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = build_request(method, uri, body.as_ref());
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder
            .body(into_body(body.as_ref()))
            .expect("Failed to build request");

        send(&self.app, request).await
    }
}

impl Default for AdminClient {
    fn default() -> Self {
        Self::new()
    }
}
