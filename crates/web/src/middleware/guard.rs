//! Route guard for page requests.
//!
//! Runs ahead of every page handler and decides from the path and the stored
//! token set alone. It never refreshes tokens; that happens in the session
//! extractors once a handler actually needs the backend.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::models::TokenSet;
use crate::services::session::SessionBridge;
use crate::state::AppState;

/// Page paths that need a signed-in user. All but `/` also cover sub-paths.
const PROTECTED_PREFIXES: [&str; 5] = [
    "/locations",
    "/storage-areas",
    "/fridge",
    "/favorites",
    "/recipes",
];

/// Paths the guard never looks at.
const EXCLUDED_PREFIXES: [&str; 4] = ["/api/", "/auth/", "/health", "/static"];

pub const LOGIN_PATH: &str = "/login";

/// What the guard does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// No session on a protected page.
    RedirectToLogin { redirect_to: String },
    /// The stored token has expired: destroy the session, then go to login.
    ExpiredSession,
    /// Signed-in user on the login page.
    RedirectHome,
}

impl GuardDecision {
    /// The redirect target, if the decision redirects.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin { redirect_to } => Some(login_url(Some(redirect_to))),
            Self::ExpiredSession => Some(LOGIN_PATH.to_owned()),
            Self::RedirectHome => Some("/".to_owned()),
        }
    }
}

/// `/login`, optionally carrying the page to come back to.
#[must_use]
pub fn login_url(redirect_to: Option<&str>) -> String {
    match redirect_to {
        Some(path) => format!("{LOGIN_PATH}?redirectTo={}", urlencoding::encode(path)),
        None => LOGIN_PATH.to_owned(),
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[must_use]
pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

#[must_use]
pub fn is_protected(path: &str) -> bool {
    path == "/"
        || PROTECTED_PREFIXES
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
}

/// Decide what to do with a page request.
#[must_use]
pub fn decide(path: &str, tokens: Option<&TokenSet>, now: i64) -> GuardDecision {
    if is_excluded(path) {
        return GuardDecision::Allow;
    }

    match tokens {
        None if is_protected(path) => GuardDecision::RedirectToLogin {
            redirect_to: path.to_owned(),
        },
        None => GuardDecision::Allow,
        Some(tokens) if tokens.is_expired_at(now) => GuardDecision::ExpiredSession,
        Some(_) if path == LOGIN_PATH => GuardDecision::RedirectHome,
        Some(_) => GuardDecision::Allow,
    }
}

/// Middleware applying [`decide`] to every request.
pub async fn route_guard(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if is_excluded(&path) {
        return next.run(request).await;
    }

    let bridge = SessionBridge::new(&session, state.identity(), state.refresher());
    let tokens = bridge.stored().await;
    let decision = decide(&path, tokens.as_ref(), Utc::now().timestamp());

    if decision == GuardDecision::ExpiredSession {
        tracing::info!(%path, "Expired session, signing out");
        bridge.destroy().await;
    }

    match decision.location() {
        Some(location) => {
            tracing::debug!(%path, %location, "Route guard redirect");
            Redirect::to(&location).into_response()
        }
        None => next.run(request).await,
    }
}
