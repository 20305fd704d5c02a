//! JSON API handlers.
//!
//! Every handler takes [`RequireSession`](crate::middleware::RequireSession),
//! so a missing or unrefreshable session answers 401 before any backend call.

pub mod categories;
pub mod items;
pub mod locations;
pub mod recipes;
pub mod stats;
pub mod storage_areas;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::services::Rename;

/// Body for creating or renaming a named entity.
#[derive(Debug, Deserialize)]
pub struct NameBody {
    #[serde(default)]
    pub name: String,
}

/// 201 with the created row.
pub(crate) fn created<T: Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

/// The renamed row, or `{"unchanged": true}` for a blank name.
pub(crate) fn renamed<T: Serialize>(outcome: Rename<T>) -> Response {
    match outcome {
        Rename::Renamed(value) => Json(value).into_response(),
        Rename::Unchanged => Json(serde_json::json!({ "unchanged": true })).into_response(),
    }
}
