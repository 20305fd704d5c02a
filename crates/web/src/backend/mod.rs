//! External backends: the identity provider and the pantry data store.
//!
//! Handlers and services only see the [`IdentityProvider`] and
//! [`PantryStore`] traits. The production implementations in [`supabase`]
//! speak GoTrue and PostgREST; tests plug in in-memory fakes.

pub mod supabase;

use async_trait::async_trait;
use pantry_core::{
    ActivityEntry, Category, CategoryId, Email, EntityName, Item, ItemId, ItemPatch, Location,
    LocationId, LocationItemCount, LocationTree, NewItem, StorageArea, StorageAreaDetail,
    StorageAreaId,
};
use secrecy::SecretString;
use thiserror::Error;

use crate::models::TokenSet;

pub use supabase::{SupabaseAuth, SupabaseRest};

/// Errors from a backend call.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The call did not finish within the configured timeout. Safe to retry.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The backend answered with an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The credentials or token were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested row does not exist (or is not visible to this user).
    #[error("Not found")]
    NotFound,

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl BackendError {
    /// Whether the user can reasonably try the same action again.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// The message the backend gave, for surfacing on auth forms.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// The four tables of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Locations,
    StorageAreas,
    Categories,
    Items,
}

impl Table {
    /// Backend table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Locations => "locations",
            Self::StorageAreas => "storage_areas",
            Self::Categories => "storage_categories",
            Self::Items => "items",
        }
    }

    /// Singular name for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Locations => "location",
            Self::StorageAreas => "storage area",
            Self::Categories => "category",
            Self::Items => "item",
        }
    }

    pub const ALL: [Self; 4] = [
        Self::Locations,
        Self::StorageAreas,
        Self::Categories,
        Self::Items,
    ];
}

/// Identity backend: password auth, token refresh and account emails.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email and password for a token set.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<TokenSet, BackendError>;

    /// Create an account. Returns tokens when the backend signs the user in
    /// straight away, or `None` when the email must be confirmed first.
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        email_redirect_to: &str,
    ) -> Result<Option<TokenSet>, BackendError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// Exchange a refresh token for a new token set.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, BackendError>;

    /// Email a password-reset link that lands on `redirect_to`.
    async fn send_password_reset(&self, email: &Email, redirect_to: &str)
    -> Result<(), BackendError>;

    /// Set a new password for the signed-in user.
    async fn update_password(
        &self,
        access_token: &str,
        password: &SecretString,
    ) -> Result<(), BackendError>;

    /// Check that the backend is reachable.
    async fn health(&self) -> Result<(), BackendError>;
}

/// Data backend for the pantry hierarchy.
///
/// Every call carries the user's access token so the backend applies its
/// row-level security. Deleting a parent relies on the backend to cascade to
/// its children.
#[async_trait]
pub trait PantryStore: Send + Sync {
    // Reads

    async fn list_locations(&self, token: &str) -> Result<Vec<Location>, BackendError>;

    /// A location with its areas, categories and items, in one round trip.
    async fn location_tree(
        &self,
        token: &str,
        id: LocationId,
    ) -> Result<Option<LocationTree>, BackendError>;

    async fn storage_area_detail(
        &self,
        token: &str,
        id: StorageAreaId,
    ) -> Result<Option<StorageAreaDetail>, BackendError>;

    // Writes

    async fn insert_location(&self, token: &str, name: &EntityName)
    -> Result<Location, BackendError>;

    async fn rename_location(
        &self,
        token: &str,
        id: LocationId,
        name: &EntityName,
    ) -> Result<Location, BackendError>;

    async fn insert_storage_area(
        &self,
        token: &str,
        location_id: LocationId,
        name: &EntityName,
    ) -> Result<StorageArea, BackendError>;

    async fn rename_storage_area(
        &self,
        token: &str,
        id: StorageAreaId,
        name: &EntityName,
    ) -> Result<StorageArea, BackendError>;

    async fn insert_category(
        &self,
        token: &str,
        storage_area_id: StorageAreaId,
        name: &EntityName,
    ) -> Result<Category, BackendError>;

    async fn rename_category(
        &self,
        token: &str,
        id: CategoryId,
        name: &EntityName,
    ) -> Result<Category, BackendError>;

    async fn insert_item(
        &self,
        token: &str,
        category_id: CategoryId,
        item: &NewItem,
    ) -> Result<Item, BackendError>;

    async fn update_item(
        &self,
        token: &str,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<Item, BackendError>;

    /// Delete one row by id. Fails with [`BackendError::NotFound`] if no row matched.
    async fn delete(&self, token: &str, table: Table, id: i64) -> Result<(), BackendError>;

    // Aggregates

    /// Row count for a table, without fetching rows.
    async fn count(&self, token: &str, table: Table) -> Result<u64, BackendError>;

    /// Newest rows of the activity view.
    async fn recent_activity(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<ActivityEntry>, BackendError>;

    async fn items_per_location(&self, token: &str)
    -> Result<Vec<LocationItemCount>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_retriable() {
        assert!(BackendError::Timeout.is_retriable());
        assert!(!BackendError::NotFound.is_retriable());
        assert!(
            !BackendError::Api {
                status: 500,
                message: "boom".to_string()
            }
            .is_retriable()
        );
    }

    #[test]
    fn test_message_prefers_backend_text() {
        let err = BackendError::Unauthorized("Invalid login credentials".to_string());
        assert_eq!(err.message(), "Invalid login credentials");
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Categories.name(), "storage_categories");
        assert_eq!(Table::ALL.len(), 4);
    }
}
