//! `/api/items`

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pantry_core::{Item, ItemId, ItemPatchInput};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireSession;
use crate::services::{BulkDeleteReport, PantryService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
    pub ids: Vec<ItemId>,
}

/// `PATCH /api/items/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<ItemId>,
    Json(input): Json<ItemPatchInput>,
) -> Result<Json<Item>> {
    let item = PantryService::new(state.store(), &tokens.access_token)
        .update_item(id, &input)
        .await?;
    Ok(Json(item))
}

/// `DELETE /api/items/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<ItemId>,
) -> Result<StatusCode> {
    PantryService::new(state.store(), &tokens.access_token)
        .delete_item(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/items/bulk-delete`
///
/// Always 200; the report says which ids went and which did not.
pub async fn bulk_delete(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Json(body): Json<BulkDeleteBody>,
) -> Json<BulkDeleteReport> {
    let report = PantryService::new(state.store(), &tokens.access_token)
        .bulk_delete_items(&body.ids)
        .await;
    Json(report)
}
