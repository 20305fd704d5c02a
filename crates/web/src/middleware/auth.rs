//! Session extractors.
//!
//! [`RequireSession`] hands a handler a token set that is good for at least
//! another minute, refreshing it on the way if needed. A missing session, or
//! a refresh the backend refuses, rejects the request: 401 JSON under `/api`,
//! a redirect to the login page everywhere else.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::middleware::guard::login_url;
use crate::models::TokenSet;
use crate::services::session::SessionBridge;
use crate::state::AppState;

/// Extractor for a valid, refreshed-if-needed token set.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireSession(tokens): RequireSession) -> impl IntoResponse {
///     format!("Hello, {}!", tokens.user.id)
/// }
/// ```
pub struct RequireSession(pub TokenSet);

/// Rejection when no usable session exists.
#[derive(Debug)]
pub enum SessionRejection {
    /// Redirect to the login page, then back to `path`.
    RedirectToLogin { path: String },
    /// JSON 401 for API requests.
    Unauthorized,
}

impl SessionRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin {
                path: path.to_owned(),
            }
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { path } => Redirect::to(&login_url(Some(&path))).into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response(),
        }
    }
}

/// Full request path, even inside a nested router.
fn request_path(parts: &Parts) -> String {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path().to_owned(), |uri| uri.path().to_owned())
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = request_path(parts);
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            tracing::error!("Session layer missing");
            return Err(SessionRejection::for_path(&path));
        };

        SessionBridge::new(&session, state.identity(), state.refresher())
            .get_valid()
            .await
            .map(Self)
            .ok_or_else(|| SessionRejection::for_path(&path))
    }
}
