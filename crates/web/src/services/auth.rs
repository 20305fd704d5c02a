//! Password authentication against the identity backend.

use pantry_core::{Email, EmailError};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::backend::{BackendError, IdentityProvider};
use crate::config::WebConfig;
use crate::error::add_breadcrumb;
use crate::models::TokenSet;
use crate::services::session::SessionError;

/// Minimum password length accepted by the identity backend.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors from an auth action.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The backend refused the request (bad credentials, existing account).
    #[error("{0}")]
    Rejected(String),

    #[error("Backend error: {0}")]
    Backend(BackendError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized(message) => Self::Rejected(message),
            BackendError::Api { status, message } if (400..500).contains(&status) => {
                Self::Rejected(message)
            }
            other => Self::Backend(other),
        }
    }
}

impl AuthError {
    /// Short code for `?error=` on the login page.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "invalid_email",
            Self::WeakPassword => "weak_password",
            Self::PasswordMismatch => "password_mismatch",
            Self::Rejected(_) => "credentials",
            Self::Backend(_) => "unavailable",
            Self::Session(_) => "session",
        }
    }

    /// True when the user can fix the problem by changing the form input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidEmail(_) | Self::WeakPassword | Self::PasswordMismatch
        )
    }
}

/// Validated email and password.
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] or [`AuthError::WeakPassword`].
    pub fn parse(email: &str, password: &str) -> Result<Self, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        Ok(Self {
            email,
            password: SecretString::from(password.to_owned()),
        })
    }
}

/// # Errors
///
/// Returns [`AuthError::WeakPassword`] for passwords shorter than
/// [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

/// Where to send the user after sign-in.
///
/// Only same-origin paths are honored; anything that could leave the site
/// (`//host`, `/\host`, absolute URLs) falls back to `/`.
#[must_use]
pub fn sanitize_redirect(target: Option<&str>) -> String {
    match target.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_owned()
        }
        _ => "/".to_owned(),
    }
}

/// Result of a sign-up.
#[derive(Debug)]
pub enum SignUp {
    /// The backend signed the user in straight away.
    SignedIn(TokenSet),
    /// A confirmation email was sent.
    ConfirmationSent,
}

pub struct AuthService<'a> {
    identity: &'a dyn IdentityProvider,
    config: &'a WebConfig,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(identity: &'a dyn IdentityProvider, config: &'a WebConfig) -> Self {
        Self { identity, config }
    }

    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] for wrong credentials.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<TokenSet, AuthError> {
        let tokens = self
            .identity
            .sign_in_with_password(&credentials.email, &credentials.password)
            .await?;

        tracing::info!(user_id = %tokens.user.id, "User signed in");
        add_breadcrumb("auth", "Signed in", None);
        Ok(tokens)
    }

    /// Create an account. The confirmation email links back to `/auth/callback`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] if the backend refuses the sign-up.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, AuthError> {
        let redirect_to = self.config.absolute_url("/auth/callback");
        let tokens = self
            .identity
            .sign_up(&credentials.email, &credentials.password, &redirect_to)
            .await?;

        tracing::info!(domain = credentials.email.domain(), "User signed up");
        Ok(tokens.map_or(SignUp::ConfirmationSent, SignUp::SignedIn))
    }

    /// Email a reset link that lands on `/reset-password`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] before any call, or the backend error.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let redirect_to = self.config.absolute_url("/reset-password");
        self.identity
            .send_password_reset(&email, &redirect_to)
            .await?;

        tracing::info!(domain = email.domain(), "Password reset requested");
        Ok(())
    }

    /// Set a new password for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::WeakPassword`] or [`AuthError::PasswordMismatch`]
    /// before any call, or the backend error.
    pub async fn update_password(
        &self,
        tokens: &TokenSet,
        password: &SecretString,
        confirmation: &SecretString,
    ) -> Result<(), AuthError> {
        validate_password(password.expose_secret())?;
        if password.expose_secret() != confirmation.expose_secret() {
            return Err(AuthError::PasswordMismatch);
        }

        self.identity
            .update_password(&tokens.access_token, password)
            .await?;

        tracing::info!(user_id = %tokens.user.id, "Password updated");
        Ok(())
    }
}
