//! `/api/categories`

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use pantry_core::{CategoryId, NewItemInput};

use super::{NameBody, created, renamed};
use crate::error::Result;
use crate::middleware::RequireSession;
use crate::services::PantryService;
use crate::state::AppState;

/// `PATCH /api/categories/{id}`
pub async fn rename(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<CategoryId>,
    Json(body): Json<NameBody>,
) -> Result<Response> {
    let outcome = PantryService::new(state.store(), &tokens.access_token)
        .rename_category(id, &body.name)
        .await?;
    Ok(renamed(outcome))
}

/// `DELETE /api/categories/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    PantryService::new(state.store(), &tokens.access_token)
        .delete_category(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/categories/{id}/items`
pub async fn create_item(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<CategoryId>,
    Json(input): Json<NewItemInput>,
) -> Result<Response> {
    let item = PantryService::new(state.store(), &tokens.access_token)
        .create_item(id, &input)
        .await?;
    Ok(created(item))
}
