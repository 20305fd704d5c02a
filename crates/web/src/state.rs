//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions_moka_store::MokaStore;

use crate::backend::{BackendError, IdentityProvider, PantryStore, SupabaseAuth, SupabaseRest};
use crate::config::WebConfig;
use crate::services::recipes::{RecipeError, RecipeService, SpoonacularClient};
use crate::services::session::TokenRefresher;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("recipe client: {0}")]
    Recipe(#[from] RecipeError),
}

/// Upper bound on live sessions. Expired ones are evicted by the cache.
const MAX_SESSIONS: u64 = 100_000;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The backends sit behind trait objects so
/// tests can swap in fakes with [`AppState::with_backends`].
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn PantryStore>,
    recipes: Option<RecipeService>,
    refresher: TokenRefresher,
    sessions: MokaStore,
    cookie_key: Key,
}

impl AppState {
    /// Create the state with the Supabase backends and, if a key is
    /// configured, the Spoonacular recipe client.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: WebConfig) -> Result<Self, StateError> {
        let identity = Arc::new(SupabaseAuth::new(&config.supabase, config.request_timeout)?);
        let store = Arc::new(SupabaseRest::new(&config.supabase, config.request_timeout)?);
        let recipes = config
            .spoonacular_api_key
            .clone()
            .map(|key| SpoonacularClient::new(key, config.request_timeout))
            .transpose()?
            .map(|client| RecipeService::new(Arc::new(client)));

        if recipes.is_none() {
            tracing::warn!("SPOONACULAR_API_KEY not set, recipe search disabled");
        }

        Ok(Self::with_backends(config, identity, store, recipes))
    }

    /// Create the state around the given backends.
    #[must_use]
    pub fn with_backends(
        config: WebConfig,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn PantryStore>,
        recipes: Option<RecipeService>,
    ) -> Self {
        let cookie_key = derive_cookie_key(&config);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                identity,
                store,
                recipes,
                refresher: TokenRefresher::new(),
                sessions: MokaStore::new(Some(MAX_SESSIONS)),
                cookie_key,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &dyn PantryStore {
        self.inner.store.as_ref()
    }

    /// The recipe service, if an API key is configured.
    #[must_use]
    pub fn recipes(&self) -> Option<&RecipeService> {
        self.inner.recipes.as_ref()
    }

    #[must_use]
    pub fn refresher(&self) -> &TokenRefresher {
        &self.inner.refresher
    }

    #[must_use]
    pub fn session_store(&self) -> &MokaStore {
        &self.inner.sessions
    }

    /// Key that encrypts the session cookie.
    #[must_use]
    pub fn cookie_key(&self) -> &Key {
        &self.inner.cookie_key
    }
}

/// 64-byte cookie key from the session secret.
fn derive_cookie_key(config: &WebConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}
