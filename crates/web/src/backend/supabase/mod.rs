//! Supabase-compatible backends.
//!
//! - [`SupabaseAuth`] - GoTrue REST API under `/auth/v1`
//! - [`SupabaseRest`] - PostgREST API under `/rest/v1`
//!
//! Both send the project's anon key as `apikey` and the user's access token
//! (or the anon key, before sign-in) as the bearer token.

mod auth;
mod rest;

pub use auth::SupabaseAuth;
pub use rest::SupabaseRest;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;

use super::BackendError;
use crate::config::SupabaseConfig;

/// Build the shared HTTP client: `apikey` header plus the request timeout.
fn build_client(config: &SupabaseConfig, timeout: Duration) -> Result<reqwest::Client, BackendError> {
    let mut headers = HeaderMap::new();
    let mut api_key = HeaderValue::from_str(config.anon_key.expose_secret())
        .map_err(|e| BackendError::Parse(format!("Invalid API key format: {e}")))?;
    api_key.set_sensitive(true);
    headers.insert("apikey", api_key);

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()?)
}

/// `<project url>/<suffix>` without doubled slashes.
fn endpoint(config: &SupabaseConfig, suffix: &str) -> String {
    format!("{}/{suffix}", config.url.as_str().trim_end_matches('/'))
}

/// Error bodies from GoTrue and PostgREST use different field names.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Turn a non-success response into a [`BackendError`].
async fn error_from_response(response: reqwest::Response) -> BackendError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or(text);

    match status.as_u16() {
        400 if message.to_lowercase().contains("invalid") => BackendError::Unauthorized(message),
        401 | 403 => BackendError::Unauthorized(message),
        404 => BackendError::NotFound,
        code => BackendError::Api {
            status: code,
            message,
        },
    }
}

/// Read a successful JSON body, or map the error status.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| BackendError::Parse(e.to_string()))
}

/// Succeed on any 2xx, discarding the body.
async fn expect_success(response: reqwest::Response) -> Result<(), BackendError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_from_response(response).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use url::Url;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let config = SupabaseConfig {
            url: Url::parse("https://abc.supabase.co/").unwrap(),
            anon_key: SecretString::from("anon"),
        };
        assert_eq!(endpoint(&config, "rest/v1"), "https://abc.supabase.co/rest/v1");
    }

    #[test]
    fn test_error_body_field_precedence() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token"}"#)
                .unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Invalid Refresh Token"));

        let body: ErrorBody = serde_json::from_str(r#"{"code":"23503","message":"violates foreign key"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("violates foreign key"));
    }
}
