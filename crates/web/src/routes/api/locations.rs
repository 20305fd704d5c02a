//! `/api/locations`

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use pantry_core::LocationId;

use super::{NameBody, created, renamed};
use crate::error::Result;
use crate::middleware::RequireSession;
use crate::services::PantryService;
use crate::state::AppState;

/// `POST /api/locations`
pub async fn create(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Json(body): Json<NameBody>,
) -> Result<Response> {
    let location = PantryService::new(state.store(), &tokens.access_token)
        .create_location(&body.name)
        .await?;
    Ok(created(location))
}

/// `PATCH /api/locations/{id}`
pub async fn rename(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<LocationId>,
    Json(body): Json<NameBody>,
) -> Result<Response> {
    let outcome = PantryService::new(state.store(), &tokens.access_token)
        .rename_location(id, &body.name)
        .await?;
    Ok(renamed(outcome))
}

/// `DELETE /api/locations/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<LocationId>,
) -> Result<StatusCode> {
    PantryService::new(state.store(), &tokens.access_token)
        .delete_location(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/locations/{id}/storage-areas`
pub async fn create_storage_area(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<LocationId>,
    Json(body): Json<NameBody>,
) -> Result<Response> {
    let area = PantryService::new(state.store(), &tokens.access_token)
        .create_storage_area(id, &body.name)
        .await?;
    Ok(created(area))
}
