//! Session bridge between the identity backend's tokens and the cookie session.
//!
//! # Lifecycle
//!
//! ```text
//! Unauthenticated ──sync──▶ Active ──refresh──▶ Active
//!        ▲                    │
//!        └──destroy / failed refresh──┘
//! ```
//!
//! The session cookie only carries an encrypted id; the token set lives in
//! the server-side session store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use thiserror::Error;
use tower_sessions::Session;

use crate::backend::{BackendError, IdentityProvider};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{TokenSet, session_keys};

/// How long a refresh result is shared with callers holding the same refresh token.
const REFRESH_SHARE_TTL: Duration = Duration::from_secs(30);

/// Errors from the session bridge.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session store could not be written.
    #[error("Failed to write session: {0}")]
    Write(#[from] tower_sessions::session::Error),

    /// The token set was already expired when it was offered.
    #[error("Token set is already expired")]
    Expired,

    /// The identity backend refused the refresh token.
    #[error("Token refresh failed: {0}")]
    Refresh(Arc<BackendError>),
}

/// Single-flight token refresh.
///
/// Callers that present the same refresh token at the same time share one
/// backend call and its result. Refresh tokens are single-use, so a second
/// exchange of the same token would fail and sign the user out.
#[derive(Clone)]
pub struct TokenRefresher {
    inflight: Cache<String, TokenSet>,
}

impl Default for TokenRefresher {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenRefresher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(REFRESH_SHARE_TTL)
                .build(),
        }
    }

    /// Exchange `refresh_token`, joining any exchange already in flight.
    ///
    /// # Errors
    ///
    /// Returns the backend error, shared between all joined callers.
    pub async fn refresh(
        &self,
        identity: &dyn IdentityProvider,
        refresh_token: &str,
    ) -> Result<TokenSet, Arc<BackendError>> {
        self.inflight
            .try_get_with(refresh_token.to_owned(), identity.refresh(refresh_token))
            .await
    }
}

/// Reads and writes the token set in one request's session.
pub struct SessionBridge<'a> {
    session: &'a Session,
    identity: &'a dyn IdentityProvider,
    refresher: &'a TokenRefresher,
}

impl<'a> SessionBridge<'a> {
    #[must_use]
    pub const fn new(
        session: &'a Session,
        identity: &'a dyn IdentityProvider,
        refresher: &'a TokenRefresher,
    ) -> Self {
        Self {
            session,
            identity,
            refresher,
        }
    }

    /// Store a token set obtained from a sign-in or a client-side identity flow.
    ///
    /// The session id is cycled so a pre-login id cannot be reused.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Expired`] for a token set that has already
    /// expired and [`SessionError::Write`] if the session store fails.
    pub async fn sync(&self, tokens: &TokenSet) -> Result<(), SessionError> {
        if tokens.is_expired() {
            return Err(SessionError::Expired);
        }
        self.session.cycle_id().await?;
        self.session.insert(session_keys::TOKENS, tokens).await?;

        set_sentry_user(&tokens.user.id, tokens.user.email.as_deref());
        tracing::info!(user_id = %tokens.user.id, "Session synced");
        Ok(())
    }

    /// The stored token set, without any expiry handling.
    pub async fn stored(&self) -> Option<TokenSet> {
        match self.session.get::<TokenSet>(session_keys::TOKENS).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session");
                None
            }
        }
    }

    /// A token set that is good for at least another minute, refreshing it
    /// first if needed.
    ///
    /// Returns `None` when there is no session, or when the refresh failed
    /// (the session is destroyed in that case).
    pub async fn get_valid(&self) -> Option<TokenSet> {
        let tokens = self.stored().await?;
        if !tokens.needs_refresh_at(Utc::now().timestamp()) {
            return Some(tokens);
        }

        match self.refresh(&tokens).await {
            Ok(fresh) => Some(fresh),
            Err(e) => {
                tracing::info!(error = %e, user_id = %tokens.user.id, "Session refresh failed, signing out");
                self.destroy().await;
                None
            }
        }
    }

    /// Exchange the stored refresh token and overwrite the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Refresh`] if the identity backend refuses, or
    /// [`SessionError::Write`] if the new tokens cannot be stored. The caller
    /// is expected to destroy the session.
    pub async fn refresh(&self, tokens: &TokenSet) -> Result<TokenSet, SessionError> {
        let fresh = self
            .refresher
            .refresh(self.identity, &tokens.refresh_token)
            .await
            .map_err(SessionError::Refresh)?;

        self.session.insert(session_keys::TOKENS, &fresh).await?;
        tracing::debug!(user_id = %fresh.user.id, expires_at = fresh.expires_at, "Session refreshed");
        Ok(fresh)
    }

    /// Clear the session and revoke the tokens with the identity backend.
    ///
    /// Never fails and can be called any number of times.
    pub async fn destroy(&self) {
        let tokens = self.stored().await;

        if let Err(e) = self.session.flush().await {
            tracing::error!(error = %e, "Failed to flush session");
        }
        clear_sentry_user();

        if let Some(tokens) = tokens
            && let Err(e) = self.identity.sign_out(&tokens.access_token).await
        {
            tracing::warn!(error = %e, "Identity backend sign-out failed");
        }
    }
}
