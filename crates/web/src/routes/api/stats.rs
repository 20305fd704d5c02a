//! `/api/stats`

use axum::{
    Json,
    extract::{Query, State},
};
use pantry_core::{EntityTotals, RenderedActivity};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireSession;
use crate::services::dashboard::clamp_activity_limit;
use crate::services::{DashboardService, ItemsPerLocation};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// `GET /api/stats/counts`
pub async fn counts(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
) -> Result<Json<EntityTotals>> {
    let totals = DashboardService::new(state.store(), &tokens.access_token)
        .counts()
        .await?;
    Ok(Json(totals))
}

/// `GET /api/stats/activity?limit=`
pub async fn activity(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<RenderedActivity>>> {
    let rows = DashboardService::new(state.store(), &tokens.access_token)
        .recent_activity(clamp_activity_limit(query.limit))
        .await?;
    Ok(Json(rows))
}

/// `GET /api/stats/items-per-location`
pub async fn items_per_location(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
) -> Result<Json<ItemsPerLocation>> {
    let counts = DashboardService::new(state.store(), &tokens.access_token)
        .items_per_location()
        .await?;
    Ok(Json(counts))
}
