//! Session middleware configuration.
//!
//! The cookie holds only the session id, encrypted with the key derived from
//! `PANTRY_SESSION_SECRET`. Token sets stay in the server-side store.

use tower_sessions::service::PrivateCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pantry_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over the state's session cache.
#[must_use]
pub fn create_session_layer(state: &AppState) -> SessionManagerLayer<MokaStore, PrivateCookie> {
    SessionManagerLayer::new(state.session_store().clone())
        .with_name(SESSION_COOKIE_NAME)
        .with_private(state.cookie_key().clone())
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(state.config().is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
