//! GoTrue identity client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pantry_core::Email;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{build_client, endpoint, expect_success, read_json};
use crate::backend::{BackendError, IdentityProvider};
use crate::config::SupabaseConfig;
use crate::models::{SessionUser, TokenSet};

/// Token response from `/token` (and from `/signup` when sign-up logs the user in).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: SessionUser,
}

impl TokenResponse {
    fn into_token_set(self) -> TokenSet {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs))
            .unwrap_or_else(|| Utc::now().timestamp());
        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// GoTrue client for `<project>/auth/v1`.
#[derive(Clone)]
pub struct SupabaseAuth {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
}

impl SupabaseAuth {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(config, timeout)?,
            base_url: endpoint(config, "auth/v1"),
            anon_key: config.anon_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<TokenSet, BackendError> {
        let response = self
            .client
            .post(self.url("token"))
            .query(&[("grant_type", grant_type)])
            .bearer_auth(self.anon_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let tokens: TokenResponse = read_json(response).await?;
        Ok(tokens.into_token_set())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<TokenSet, BackendError> {
        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        });
        self.token_grant("password", body).await
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        email_redirect_to: &str,
    ) -> Result<Option<TokenSet>, BackendError> {
        let response = self
            .client
            .post(self.url("signup"))
            .query(&[("redirect_to", email_redirect_to)])
            .bearer_auth(self.anon_key.expose_secret())
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
            }))
            .send()
            .await?;

        // With email confirmation on, the body is just the user.
        let body: serde_json::Value = read_json(response).await?;
        if body.get("access_token").is_none() {
            return Ok(None);
        }
        let tokens: TokenResponse =
            serde_json::from_value(body).map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(Some(tokens.into_token_set()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("logout"))
            .bearer_auth(access_token)
            .send()
            .await?;
        expect_success(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, BackendError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        self.token_grant("refresh_token", body).await
    }

    async fn send_password_reset(
        &self,
        email: &Email,
        redirect_to: &str,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url("recover"))
            .query(&[("redirect_to", redirect_to)])
            .bearer_auth(self.anon_key.expose_secret())
            .json(&serde_json::json!({ "email": email.as_str() }))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn update_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.url("user"))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "password": password.expose_secret() }))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn health(&self) -> Result<(), BackendError> {
        let response = self.client.get(self.url("health")).send().await?;
        expect_success(response).await
    }
}
