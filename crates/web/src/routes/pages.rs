//! Page data handlers.
//!
//! Each page answers with the JSON its view renders from. The route guard
//! has already turned away visitors without a session; the extractor then
//! makes sure the token is fresh before any backend call.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use pantry_core::{ItemFilter, Location, LocationId, LocationTree, StorageAreaDetail, StorageAreaId};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireSession;
use crate::services::auth::sanitize_redirect;
use crate::services::{Dashboard, DashboardService, PantryService};
use crate::state::AppState;

/// Query parameters of the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "redirectTo")]
    pub redirect_to: Option<String>,
    pub error: Option<String>,
}

/// Data for the login page.
#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub redirect_to: String,
    pub error: Option<String>,
}

/// `GET /`
pub async fn dashboard(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
) -> Result<Json<Dashboard>> {
    let dashboard = DashboardService::new(state.store(), &tokens.access_token)
        .load()
        .await?;
    Ok(Json(dashboard))
}

/// `GET /locations`
pub async fn locations(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
) -> Result<Json<Vec<Location>>> {
    let locations = PantryService::new(state.store(), &tokens.access_token)
        .list_locations()
        .await?;
    Ok(Json(locations))
}

/// `GET /locations/{id}?q=&expiring_within=`
pub async fn location(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<LocationId>,
    Query(filter): Query<ItemFilter>,
) -> Result<Json<LocationTree>> {
    let today = Utc::now().date_naive();
    let tree = PantryService::new(state.store(), &tokens.access_token)
        .location_tree(id, &filter, today)
        .await?;
    Ok(Json(tree))
}

/// `GET /storage-areas/{id}`
pub async fn storage_area(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Path(id): Path<StorageAreaId>,
) -> Result<Json<StorageAreaDetail>> {
    let detail = PantryService::new(state.store(), &tokens.access_token)
        .storage_area(id)
        .await?;
    Ok(Json(detail))
}

/// `GET /login`
pub async fn login(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        redirect_to: sanitize_redirect(query.redirect_to.as_deref()),
        error: query.error,
    })
}
