//! Session-related types.
//!
//! The token set issued by the identity backend is what the encrypted session
//! cookie carries.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seconds before expiry at which a token is refreshed ahead of use.
pub const REFRESH_WINDOW_SECS: i64 = 60;

/// The signed-in user, as reported by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Identity backend user id.
    pub id: Uuid,
    /// Email address, if the account has one.
    #[serde(default)]
    pub email: Option<String>,
}

/// Access/refresh token pair for one signed-in user.
///
/// Implements `Debug` manually to redact both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token for backend calls.
    pub access_token: String,
    /// Single-use token that buys a new pair.
    pub refresh_token: String,
    /// Unix timestamp (seconds) when `access_token` stops working.
    pub expires_at: i64,
    /// Who the tokens belong to.
    pub user: SessionUser,
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

impl TokenSet {
    /// Whether the access token has already expired at `now`.
    #[must_use]
    pub const fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }

    /// Whether the access token has expired as of the current time.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Whether the token should be refreshed before use at `now`.
    #[must_use]
    pub const fn needs_refresh_at(&self, now: i64) -> bool {
        now >= self.expires_at - REFRESH_WINDOW_SECS
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the token set of the signed-in user.
    pub const TOKENS: &str = "tokens";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(expires_at: i64) -> TokenSet {
        TokenSet {
            access_token: "access-abc".to_string(),
            refresh_token: "refresh-xyz".to_string(),
            expires_at,
            user: SessionUser {
                id: Uuid::nil(),
                email: Some("cook@example.com".to_string()),
            },
        }
    }

    #[test]
    fn test_refresh_window() {
        let t = tokens(1_000);
        assert!(!t.needs_refresh_at(900));
        assert!(t.needs_refresh_at(940));
        assert!(t.needs_refresh_at(2_000));
    }

    #[test]
    fn test_expiry() {
        let t = tokens(1_000);
        assert!(!t.is_expired_at(999));
        assert!(t.is_expired_at(1_000));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let output = format!("{:?}", tokens(1));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("access-abc"));
        assert!(!output.contains("refresh-xyz"));
        assert!(output.contains("cook@example.com"));
    }

    #[test]
    fn test_client_payload_deserializes() {
        // Browser SDKs send the full user object; only id and email are kept.
        let json = r#"{
            "access_token": "a",
            "refresh_token": "r",
            "expires_at": 1735689600,
            "user": {
                "id": "2b1c4a4e-3d1f-4a57-9c1e-5f0e2d9a1b77",
                "email": "cook@example.com",
                "role": "authenticated",
                "app_metadata": {}
            }
        }"#;
        let parsed: Result<TokenSet, _> = serde_json::from_str(json);
        assert!(parsed.is_ok_and(|t| t.expires_at == 1_735_689_600));
    }
}
