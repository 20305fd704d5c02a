//! Recipe suggestions from ingredients on hand.
//!
//! Backed by Spoonacular's `findByIngredients`. Results are cached in memory
//! per ingredient list for a few minutes; the free API tier is heavily
//! rate limited.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const FIND_BY_INGREDIENTS_URL: &str = "https://api.spoonacular.com/recipes/findByIngredients";

/// Candidates requested per lookup.
const RESULT_COUNT: u32 = 10;

/// Rank by most used ingredients rather than fewest missing.
const RANKING_MAXIMIZE_USED: u32 = 1;

const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Errors from a recipe lookup.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// No API key is configured.
    #[error("Recipe search is not configured")]
    NotConfigured,

    /// The ingredient list was empty after trimming.
    #[error("at least one ingredient is required")]
    NoIngredients,

    #[error("Recipe API timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Recipe API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// An error from a lookup this request joined.
    #[error(transparent)]
    Shared(Arc<Self>),
}

impl From<reqwest::Error> for RecipeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl RecipeError {
    /// The underlying error, looking through [`RecipeError::Shared`].
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Shared(inner) => inner.root(),
            other => other,
        }
    }
}

/// One ranked recipe candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase", serialize = "snake_case"))]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub used_ingredient_count: u32,
    #[serde(default)]
    pub missed_ingredient_count: u32,
    #[serde(default)]
    pub likes: u32,
}

/// Source of recipe candidates.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Recipes that use the given (already normalized) ingredients.
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<RecipeSummary>, RecipeError>;
}

/// Spoonacular API client.
pub struct SpoonacularClient {
    client: reqwest::Client,
    api_key: SecretString,
}

impl SpoonacularClient {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, RecipeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl RecipeSource for SpoonacularClient {
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<RecipeSummary>, RecipeError> {
        let response = self
            .client
            .get(FIND_BY_INGREDIENTS_URL)
            .query(&[
                ("ingredients", ingredients.join(",")),
                ("number", RESULT_COUNT.to_string()),
                ("ranking", RANKING_MAXIMIZE_USED.to_string()),
                ("apiKey", self.api_key.expose_secret().to_owned()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RecipeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| RecipeError::Parse(e.to_string()))
    }
}

/// Split a comma-separated ingredient list, trimming and dropping blanks.
#[must_use]
pub fn normalize_ingredients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Cached recipe lookup.
#[derive(Clone)]
pub struct RecipeService {
    source: Arc<dyn RecipeSource>,
    cache: Cache<String, Vec<RecipeSummary>>,
}

impl RecipeService {
    #[must_use]
    pub fn new(source: Arc<dyn RecipeSource>) -> Self {
        Self {
            source,
            cache: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Recipes for a comma-separated ingredient list.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::NoIngredients`] without calling the API when
    /// the list is blank, or the API error.
    pub async fn find(&self, raw_ingredients: &str) -> Result<Vec<RecipeSummary>, RecipeError> {
        let ingredients = normalize_ingredients(raw_ingredients);
        if ingredients.is_empty() {
            return Err(RecipeError::NoIngredients);
        }

        let key = ingredients.join(",");
        let source = Arc::clone(&self.source);
        self.cache
            .try_get_with(key, async move {
                tracing::debug!(count = ingredients.len(), "Looking up recipes");
                source.find_by_ingredients(&ingredients).await
            })
            .await
            .map_err(RecipeError::Shared)
    }
}
