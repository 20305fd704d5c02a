//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before the response is built; clients get a JSON
//! `{"error": "..."}` body that never carries backend internals.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pantry_core::PatchError;
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::{AuthError, RecipeError, SessionError, SyncError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before any backend call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error("{0} not found")]
    NotFound(String),
}

impl From<PatchError> for AppError {
    fn from(err: PatchError) -> Self {
        Self::Validation(err.to_string())
    }
}

fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        BackendError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        BackendError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn backend_message(err: &BackendError) -> String {
    match err {
        BackendError::Timeout => "The backend did not respond in time".to_string(),
        BackendError::Unauthorized(_) => "Unauthorized".to_string(),
        BackendError::NotFound => "Not found".to_string(),
        _ => "External service error".to_string(),
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sync(err) => match err {
                SyncError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SyncError::NotFound(_) => StatusCode::NOT_FOUND,
                SyncError::Backend(e) => backend_status(e),
            },
            Self::Backend(e) => backend_status(e),
            Self::Session(err) => match err {
                SessionError::Write(_) => StatusCode::INTERNAL_SERVER_ERROR,
                SessionError::Expired | SessionError::Refresh(_) => StatusCode::UNAUTHORIZED,
            },
            Self::Auth(err) => match err {
                e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::Rejected(_) => StatusCode::BAD_REQUEST,
                AuthError::Backend(e) => backend_status(e),
                AuthError::Session(SessionError::Write(_)) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::Recipe(err) => match err.root() {
                RecipeError::NoIngredients => StatusCode::UNPROCESSABLE_ENTITY,
                RecipeError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                RecipeError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Client-safe message.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Sync(SyncError::Backend(e)) | Self::Backend(e) => backend_message(e),
            Self::Auth(AuthError::Backend(e)) => backend_message(e),
            Self::Session(SessionError::Write(_))
            | Self::Auth(AuthError::Session(SessionError::Write(_))) => {
                "Internal server error".to_string()
            }
            Self::Session(_) => "Session expired, please sign in again".to_string(),
            Self::Recipe(err) => match err.root() {
                RecipeError::NoIngredients | RecipeError::NotConfigured => err.to_string(),
                RecipeError::Timeout => "Recipe search timed out".to_string(),
                _ => "Recipe search failed".to_string(),
            },
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("pantry", "Added item", Some(&[("name", "Beans")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
