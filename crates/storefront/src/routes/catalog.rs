//! Catalog route handlers.
//!
//! The catalog is static, so responses may be cached briefly by clients.

use axum::{
    Json,
    extract::{Path, State},
    http::header::CACHE_CONTROL,
    response::IntoResponse,
};
use brightwire_core::{Catalog, Offering, ProductType};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

const CATALOG_CACHE_CONTROL: &str = "public, max-age=300";

/// The whole catalog, grouped by category.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let catalog: Catalog = state.catalog().clone();
    ([(CACHE_CONTROL, CATALOG_CACHE_CONTROL)], Json(catalog))
}

/// Offerings in one category.
#[instrument(skip(state))]
pub async fn category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse> {
    let category: ProductType = category
        .parse()
        .map_err(|e: brightwire_core::UnknownProductType| AppError::NotFound(e.to_string()))?;
    let offerings: Vec<Offering> = state.catalog().offerings(category).to_vec();
    Ok(([(CACHE_CONTROL, CATALOG_CACHE_CONTROL)], Json(offerings)))
}
