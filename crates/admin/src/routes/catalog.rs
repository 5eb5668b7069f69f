//! Catalog editor route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use brightwire_core::{CatalogStatus, ProductId, ProductType};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::{CatalogDraft, CatalogQuery, CatalogRecord};
use crate::error::{AppError, Result};
use crate::middleware::RequireApiToken;
use crate::state::AppState;

/// New publication status for a record.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: CatalogStatus,
}

fn parse_category(category: &str) -> Result<ProductType> {
    category
        .parse()
        .map_err(|_| AppError::NotFound(format!("category {category}")))
}

/// Search records.
#[instrument(skip(_auth, state))]
pub async fn list(
    _auth: RequireApiToken,
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<Vec<CatalogRecord>> {
    let editor = state.editor().read().await;
    Json(editor.search(&query).into_iter().cloned().collect())
}

/// Show one record.
#[instrument(skip(_auth, state))]
pub async fn show(
    _auth: RequireApiToken,
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
) -> Result<Json<CatalogRecord>> {
    let category = parse_category(&category)?;
    let editor = state.editor().read().await;
    let record = editor.get(category, ProductId::new(id))?;
    Ok(Json(record.clone()))
}

/// Create a record in a category.
#[instrument(skip(_auth, state, draft))]
pub async fn create(
    _auth: RequireApiToken,
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(draft): Json<CatalogDraft>,
) -> Result<(StatusCode, Json<CatalogRecord>)> {
    let category = parse_category(&category)?;
    let record = state.editor().write().await.create(category, draft)?;

    tracing::info!(%category, id = %record.id, title = %record.title, "catalog record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Replace a record's editable fields.
#[instrument(skip(_auth, state, draft))]
pub async fn update(
    _auth: RequireApiToken,
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    Json(draft): Json<CatalogDraft>,
) -> Result<Json<CatalogRecord>> {
    let category = parse_category(&category)?;
    let record = state
        .editor()
        .write()
        .await
        .update(category, ProductId::new(id), draft)?;

    tracing::info!(%category, id, "catalog record updated");
    Ok(Json(record))
}

/// Change a record's publication status.
#[instrument(skip(_auth, state, update))]
pub async fn set_status(
    _auth: RequireApiToken,
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<CatalogRecord>> {
    let category = parse_category(&category)?;
    let record = state
        .editor()
        .write()
        .await
        .set_status(category, ProductId::new(id), update.status)?;

    tracing::info!(%category, id, status = %record.status, "catalog status changed");
    Ok(Json(record))
}

/// Delete a record.
#[instrument(skip(_auth, state))]
pub async fn delete(
    _auth: RequireApiToken,
    State(state): State<AppState>,
    Path((category, id)): Path<(String, i32)>,
) -> Result<StatusCode> {
    let category = parse_category(&category)?;
    let removed = state
        .editor()
        .write()
        .await
        .delete(category, ProductId::new(id))?;

    tracing::info!(%category, id, title = %removed.title, "catalog record deleted");
    Ok(StatusCode::NO_CONTENT)
}
