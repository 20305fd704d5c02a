//! `/api/storage-areas`

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use pantry_core::StorageAreaId;

use super::{NameBody, created, renamed};
use crate::error::Result;
use crate::middleware::RequireSession;
use crate::services::PantryService;
use crate::state::AppState;

/// `PATCH /api/storage-areas/{id}`
pub async fn rename(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<StorageAreaId>,
    Json(body): Json<NameBody>,
) -> Result<Response> {
    let outcome = PantryService::new(state.store(), &tokens.access_token)
        .rename_storage_area(id, &body.name)
        .await?;
    Ok(renamed(outcome))
}

/// `DELETE /api/storage-areas/{id}`
///
/// Removes the area's categories and items with it.
pub async fn delete(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<StorageAreaId>,
) -> Result<StatusCode> {
    PantryService::new(state.store(), &tokens.access_token)
        .delete_storage_area(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/storage-areas/{id}/categories`
pub async fn create_category(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<StorageAreaId>,
    Json(body): Json<NameBody>,
) -> Result<Response> {
    let category = PantryService::new(state.store(), &tokens.access_token)
        .create_category(id, &body.name)
        .await?;
    Ok(created(category))
}
