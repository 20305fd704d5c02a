//! `/api/recipes`

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::error::Result;
use crate::middleware::RequireSession;
use crate::services::{RecipeError, RecipeSummary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub ingredients: String,
}

/// `GET /api/recipes?ingredients=a,b,c`
pub async fn search(
    State(state): State<AppState>,
    RequireSession(_tokens): RequireSession,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<Vec<RecipeSummary>>> {
    let recipes = state.recipes().ok_or(RecipeError::NotConfigured)?;
    let found = recipes.find(&query.ingredients).await?;
    Ok(Json(found))
}
