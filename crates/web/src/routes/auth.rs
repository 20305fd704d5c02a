//! Authentication route handlers.
//!
//! Sign-in redirects back into the site; the other actions answer JSON.
//! `/api/sync-session` is the landing point for token sets obtained by a
//! client-side identity flow (email confirmation, password recovery links).

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::RequireSession;
use crate::middleware::guard::LOGIN_PATH;
use crate::models::TokenSet;
use crate::services::auth::sanitize_redirect;
use crate::services::{AuthError, AuthService, Credentials, SessionBridge, SignUp};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirm: String,
}

fn bridge<'a>(state: &'a AppState, session: &'a Session) -> SessionBridge<'a> {
    SessionBridge::new(session, state.identity(), state.refresher())
}

/// `/login?error=<code>`, keeping the page the user was heading to.
fn login_error_url(err: &AuthError, redirect_to: &str) -> String {
    let mut url = format!("{LOGIN_PATH}?error={}", err.code());
    if redirect_to != "/" {
        url.push_str("&redirectTo=");
        url.push_str(&urlencoding::encode(redirect_to));
    }
    url
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let redirect_to = sanitize_redirect(form.redirect_to.as_deref());

    let result = async {
        let credentials = Credentials::parse(&form.email, &form.password)?;
        let tokens = AuthService::new(state.identity(), state.config())
            .sign_in(&credentials)
            .await?;
        bridge(&state, &session).sync(&tokens).await?;
        Ok::<_, AuthError>(())
    }
    .await;

    match result {
        Ok(()) => Redirect::to(&redirect_to).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, code = e.code(), "Login failed");
            Redirect::to(&login_error_url(&e, &redirect_to)).into_response()
        }
    }
}

/// `POST /auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignUpForm>,
) -> Result<Json<serde_json::Value>> {
    let credentials = Credentials::parse(&form.email, &form.password)?;
    let outcome = AuthService::new(state.identity(), state.config())
        .sign_up(&credentials)
        .await?;

    let message = match outcome {
        SignUp::SignedIn(tokens) => {
            bridge(&state, &session).sync(&tokens).await?;
            "Account created"
        }
        SignUp::ConfirmationSent => "Check your email to confirm your account",
    };
    Ok(Json(json!({ "message": message })))
}

/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    bridge(&state, &session).destroy().await;
    tracing::info!("User signed out");
    Redirect::to(LOGIN_PATH)
}

/// `POST /auth/forgot-password`
///
/// Answers the same whether or not the account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Json<serde_json::Value>> {
    match AuthService::new(state.identity(), state.config())
        .send_password_reset(&form.email)
        .await
    {
        Ok(()) | Err(AuthError::Rejected(_)) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(Json(json!({
        "message": "If an account exists for that email, a reset link is on its way"
    })))
}

/// `POST /auth/reset-password`
pub async fn reset_password(
    State(state): State<AppState>,
    RequireSession(tokens): RequireSession,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Json<serde_json::Value>> {
    AuthService::new(state.identity(), state.config())
        .update_password(
            &tokens,
            &SecretString::from(form.password),
            &SecretString::from(form.password_confirm),
        )
        .await?;
    Ok(Json(json!({ "message": "Password updated" })))
}

/// `POST /api/sync-session`
pub async fn sync_session(
    State(state): State<AppState>,
    session: Session,
    Json(tokens): Json<TokenSet>,
) -> Response {
    match bridge(&state, &session).sync(&tokens).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to sync session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to sync session" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_url_keeps_target() {
        assert_eq!(
            login_error_url(&AuthError::WeakPassword, "/locations/2"),
            "/login?error=weak_password&redirectTo=%2Flocations%2F2"
        );
        assert_eq!(
            login_error_url(&AuthError::Rejected("nope".to_string()), "/"),
            "/login?error=credentials"
        );
    }
}
