//! Integration test support for the pantry web service.
//!
//! The tests drive the real axum router (`pantry_web::app`) with
//! `tower::ServiceExt::oneshot`, against in-memory fakes of the identity and
//! data backends. No network or database is needed:
//!
//! ```bash
//! cargo test -p pantry-integration-tests
//! ```
//!
//! - [`FakeIdentity`] - password sign-in, single-use refresh tokens, call counters
//! - [`FakeStore`] - the four-level hierarchy with cascade deletes, an activity
//!   log and injectable delete failures
//! - [`TestApp`] - the router plus a cookie jar of one

#![allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::must_use_candidate)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use chrono::{DateTime, TimeZone, Utc};
use pantry_core::{
    ActivityAction, ActivityEntry, AreaNode, Category, CategoryId, CategoryNode, Email, EntityKind,
    EntityName, Item, ItemId, ItemPatch, Location, LocationId, LocationItemCount, LocationTree,
    NewItem, StorageArea, StorageAreaDetail, StorageAreaId,
};
use pantry_web::backend::{BackendError, IdentityProvider, PantryStore, Table};
use pantry_web::config::{SupabaseConfig, WebConfig};
use pantry_web::models::{SessionUser, TokenSet};
use pantry_web::services::{RecipeError, RecipeService, RecipeSource, RecipeSummary};
use pantry_web::state::AppState;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_EMAIL: &str = "cook@example.com";
pub const TEST_PASSWORD: &str = "correct-horse";

/// Configuration pointing at nothing; the fakes never touch the network.
pub fn test_config() -> WebConfig {
    WebConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("k7#Qp2!vX9@mLr4$Tz8^Wn1&Hy6*Bc3Jd5%Fg0"),
        supabase: SupabaseConfig {
            url: "http://supabase.test".parse().unwrap(),
            anon_key: SecretString::from("anon-key"),
        },
        spoonacular_api_key: None,
        request_timeout: Duration::from_secs(5),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

// =============================================================================
// Identity
// =============================================================================

/// In-memory identity backend.
///
/// Refresh tokens are single-use, like the real thing: presenting one twice
/// fails.
pub struct FakeIdentity {
    user: SessionUser,
    password: String,
    /// Lifetime of issued access tokens, in seconds.
    pub token_ttl: AtomicI64,
    /// Delay inside `refresh`, to widen the window for concurrent callers.
    pub refresh_delay: Mutex<Duration>,
    pub fail_refresh: AtomicBool,
    pub sign_in_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub reset_emails: Mutex<Vec<(String, String)>>,
    live_refresh_tokens: Mutex<HashSet<String>>,
    issued: AtomicUsize,
}

impl Default for FakeIdentity {
    fn default() -> Self {
        Self {
            user: SessionUser {
                id: Uuid::new_v4(),
                email: Some(TEST_EMAIL.to_string()),
            },
            password: TEST_PASSWORD.to_string(),
            token_ttl: AtomicI64::new(3600),
            refresh_delay: Mutex::new(Duration::ZERO),
            fail_refresh: AtomicBool::new(false),
            sign_in_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            reset_emails: Mutex::new(Vec::new()),
            live_refresh_tokens: Mutex::new(HashSet::new()),
            issued: AtomicUsize::new(0),
        }
    }
}

impl FakeIdentity {
    /// Issue a fresh token pair that expires `ttl` seconds from now.
    pub fn issue_with_ttl(&self, ttl: i64) -> TokenSet {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        let refresh_token = format!("refresh-{n}");
        self.live_refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh_token.clone());
        TokenSet {
            access_token: format!("access-{n}"),
            refresh_token,
            expires_at: Utc::now().timestamp() + ttl,
            user: self.user.clone(),
        }
    }

    pub fn issue(&self) -> TokenSet {
        self.issue_with_ttl(self.token_ttl.load(Ordering::SeqCst))
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<TokenSet, BackendError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        if email.as_str() == TEST_EMAIL && password.expose_secret() == self.password {
            Ok(self.issue())
        } else {
            Err(BackendError::Unauthorized(
                "Invalid login credentials".to_string(),
            ))
        }
    }

    async fn sign_up(
        &self,
        email: &Email,
        _password: &SecretString,
        _email_redirect_to: &str,
    ) -> Result<Option<TokenSet>, BackendError> {
        if email.as_str() == TEST_EMAIL {
            return Err(BackendError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        Ok(None)
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), BackendError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, BackendError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.refresh_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(BackendError::Unauthorized(
                "Invalid Refresh Token".to_string(),
            ));
        }
        if !self
            .live_refresh_tokens
            .lock()
            .unwrap()
            .remove(refresh_token)
        {
            return Err(BackendError::Unauthorized(
                "Invalid Refresh Token: Already Used".to_string(),
            ));
        }
        Ok(self.issue())
    }

    async fn send_password_reset(
        &self,
        email: &Email,
        redirect_to: &str,
    ) -> Result<(), BackendError> {
        self.reset_emails
            .lock()
            .unwrap()
            .push((email.to_string(), redirect_to.to_string()));
        Ok(())
    }

    async fn update_password(
        &self,
        _access_token: &str,
        _password: &SecretString,
    ) -> Result<(), BackendError> {
        Ok(())
    }

    async fn health(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

// =============================================================================
// Data store
// =============================================================================

#[derive(Default)]
struct Rows {
    next_id: i64,
    clock: i64,
    locations: Vec<Location>,
    areas: Vec<StorageArea>,
    categories: Vec<Category>,
    items: Vec<Item>,
    activity: Vec<ActivityEntry>,
}

impl Rows {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps so ordering is deterministic.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.timestamp_opt(1_735_689_600 + self.clock, 0).unwrap()
    }

    fn location_name(&self, id: LocationId) -> Option<String> {
        self.locations
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.name.clone())
    }

    fn area_path(&self, id: StorageAreaId) -> (Option<String>, Option<String>) {
        self.areas.iter().find(|a| a.id == id).map_or((None, None), |a| {
            (Some(a.name.clone()), self.location_name(a.location_id))
        })
    }

    fn category_path(&self, id: CategoryId) -> (Option<String>, Option<String>, Option<String>) {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map_or((None, None, None), |c| {
                let (area, location) = self.area_path(c.storage_area_id);
                (Some(c.name.clone()), area, location)
            })
    }

    fn log(&mut self, entry: ActivityEntry) {
        self.activity.push(entry);
    }

    fn entry(&mut self, entity_type: EntityKind, action: ActivityAction, name: &str) -> ActivityEntry {
        let created_at = self.tick();
        ActivityEntry {
            id: Some(self.next_id()),
            created_at,
            entity_type,
            action,
            location_name: None,
            storage_area_name: None,
            category_name: None,
            item_name: None,
            item_or_entity_name: Some(name.to_string()),
            quantity: None,
            expiration_date: None,
            changes: None,
        }
    }
}

/// In-memory data backend.
#[derive(Default)]
pub struct FakeStore {
    rows: Mutex<Rows>,
    /// Every backend call, reads included.
    pub calls: AtomicUsize,
    /// Item ids whose delete fails with a server error.
    pub failing_deletes: Mutex<HashSet<i64>>,
    /// Access tokens the store accepts; empty means any.
    pub accepted_tokens: Mutex<HashSet<String>>,
}

impl FakeStore {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn item_count(&self) -> usize {
        self.rows.lock().unwrap().items.len()
    }

    pub fn fail_delete_of(&self, id: ItemId) {
        self.failing_deletes.lock().unwrap().insert(id.as_i64());
    }

    fn enter(&self, token: &str) -> Result<std::sync::MutexGuard<'_, Rows>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let accepted = self.accepted_tokens.lock().unwrap();
        if !accepted.is_empty() && !accepted.contains(token) {
            return Err(BackendError::Unauthorized("JWT expired".to_string()));
        }
        drop(accepted);
        Ok(self.rows.lock().unwrap())
    }
}

fn missing_parent() -> BackendError {
    BackendError::Api {
        status: 409,
        message: "violates foreign key constraint".to_string(),
    }
}

#[async_trait]
impl PantryStore for FakeStore {
    async fn list_locations(&self, token: &str) -> Result<Vec<Location>, BackendError> {
        Ok(self.enter(token)?.locations.clone())
    }

    async fn location_tree(
        &self,
        token: &str,
        id: LocationId,
    ) -> Result<Option<LocationTree>, BackendError> {
        let rows = self.enter(token)?;
        let Some(location) = rows.locations.iter().find(|l| l.id == id).cloned() else {
            return Ok(None);
        };
        let areas = rows
            .areas
            .iter()
            .filter(|a| a.location_id == id)
            .map(|area| AreaNode {
                area: area.clone(),
                categories: rows
                    .categories
                    .iter()
                    .filter(|c| c.storage_area_id == area.id)
                    .map(|category| CategoryNode {
                        category: category.clone(),
                        items: rows
                            .items
                            .iter()
                            .filter(|i| i.category_id == category.id)
                            .cloned()
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Ok(Some(LocationTree::new(location, areas)))
    }

    async fn storage_area_detail(
        &self,
        token: &str,
        id: StorageAreaId,
    ) -> Result<Option<StorageAreaDetail>, BackendError> {
        let rows = self.enter(token)?;
        let Some(area) = rows.areas.iter().find(|a| a.id == id).cloned() else {
            return Ok(None);
        };
        let Some(location) = rows
            .locations
            .iter()
            .find(|l| l.id == area.location_id)
            .cloned()
        else {
            return Ok(None);
        };
        let categories = rows
            .categories
            .iter()
            .filter(|c| c.storage_area_id == id)
            .cloned()
            .collect();
        Ok(Some(StorageAreaDetail {
            area,
            location,
            categories,
        }))
    }

    async fn insert_location(
        &self,
        token: &str,
        name: &EntityName,
    ) -> Result<Location, BackendError> {
        let mut rows = self.enter(token)?;
        let location = Location {
            id: LocationId::new(rows.next_id()),
            name: name.to_string(),
            created_at: rows.tick(),
        };
        rows.locations.push(location.clone());
        let mut entry = rows.entry(EntityKind::Location, ActivityAction::Added, name.as_str());
        entry.location_name = Some(name.to_string());
        rows.log(entry);
        Ok(location)
    }

    async fn rename_location(
        &self,
        token: &str,
        id: LocationId,
        name: &EntityName,
    ) -> Result<Location, BackendError> {
        let mut rows = self.enter(token)?;
        let location = rows
            .locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(BackendError::NotFound)?;
        location.name = name.to_string();
        Ok(location.clone())
    }

    async fn insert_storage_area(
        &self,
        token: &str,
        location_id: LocationId,
        name: &EntityName,
    ) -> Result<StorageArea, BackendError> {
        let mut rows = self.enter(token)?;
        let location_name = rows.location_name(location_id).ok_or_else(missing_parent)?;
        let area = StorageArea {
            id: StorageAreaId::new(rows.next_id()),
            name: name.to_string(),
            location_id,
            created_at: rows.tick(),
        };
        rows.areas.push(area.clone());
        let mut entry = rows.entry(EntityKind::StorageArea, ActivityAction::Added, name.as_str());
        entry.storage_area_name = Some(name.to_string());
        entry.location_name = Some(location_name);
        rows.log(entry);
        Ok(area)
    }

    async fn rename_storage_area(
        &self,
        token: &str,
        id: StorageAreaId,
        name: &EntityName,
    ) -> Result<StorageArea, BackendError> {
        let mut rows = self.enter(token)?;
        let area = rows
            .areas
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(BackendError::NotFound)?;
        area.name = name.to_string();
        Ok(area.clone())
    }

    async fn insert_category(
        &self,
        token: &str,
        storage_area_id: StorageAreaId,
        name: &EntityName,
    ) -> Result<Category, BackendError> {
        let mut rows = self.enter(token)?;
        let (Some(area_name), location_name) = rows.area_path(storage_area_id) else {
            return Err(missing_parent());
        };
        let category = Category {
            id: CategoryId::new(rows.next_id()),
            name: name.to_string(),
            storage_area_id,
            created_at: rows.tick(),
        };
        rows.categories.push(category.clone());
        let mut entry = rows.entry(EntityKind::Category, ActivityAction::Added, name.as_str());
        entry.category_name = Some(name.to_string());
        entry.storage_area_name = Some(area_name);
        entry.location_name = location_name;
        rows.log(entry);
        Ok(category)
    }

    async fn rename_category(
        &self,
        token: &str,
        id: CategoryId,
        name: &EntityName,
    ) -> Result<Category, BackendError> {
        let mut rows = self.enter(token)?;
        let category = rows
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(BackendError::NotFound)?;
        category.name = name.to_string();
        Ok(category.clone())
    }

    async fn insert_item(
        &self,
        token: &str,
        category_id: CategoryId,
        item: &NewItem,
    ) -> Result<Item, BackendError> {
        let mut rows = self.enter(token)?;
        let (Some(category_name), area_name, location_name) = rows.category_path(category_id)
        else {
            return Err(missing_parent());
        };
        let created = Item {
            id: ItemId::new(rows.next_id()),
            name: item.name.to_string(),
            quantity: item.quantity,
            expiration_date: item.expiration_date,
            category_id,
            created_at: Some(rows.tick()),
        };
        rows.items.push(created.clone());
        let mut entry = rows.entry(EntityKind::Item, ActivityAction::Added, item.name.as_str());
        entry.item_name = Some(item.name.to_string());
        entry.category_name = Some(category_name);
        entry.storage_area_name = area_name;
        entry.location_name = location_name;
        entry.quantity = Some(i64::from(item.quantity.get()));
        entry.expiration_date = item.expiration_date.map(|d| d.to_string());
        rows.log(entry);
        Ok(created)
    }

    async fn update_item(
        &self,
        token: &str,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<Item, BackendError> {
        let mut rows = self.enter(token)?;
        let item = rows
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(BackendError::NotFound)?;
        patch.apply_to(item);
        Ok(item.clone())
    }

    async fn delete(&self, token: &str, table: Table, id: i64) -> Result<(), BackendError> {
        let mut rows = self.enter(token)?;
        if table == Table::Items && self.failing_deletes.lock().unwrap().contains(&id) {
            return Err(BackendError::Api {
                status: 500,
                message: "could not obtain lock on row".to_string(),
            });
        }

        let Rows {
            locations,
            areas,
            categories,
            items,
            ..
        } = &mut *rows;
        let before = locations.len() + areas.len() + categories.len() + items.len();
        match table {
            Table::Locations => locations.retain(|l| l.id.as_i64() != id),
            Table::StorageAreas => areas.retain(|a| a.id.as_i64() != id),
            Table::Categories => categories.retain(|c| c.id.as_i64() != id),
            Table::Items => items.retain(|i| i.id.as_i64() != id),
        }
        if locations.len() + areas.len() + categories.len() + items.len() == before {
            return Err(BackendError::NotFound);
        }

        // Cascade
        areas.retain(|a| locations.iter().any(|l| l.id == a.location_id));
        categories.retain(|c| areas.iter().any(|a| a.id == c.storage_area_id));
        items.retain(|i| categories.iter().any(|c| c.id == i.category_id));
        Ok(())
    }

    async fn count(&self, token: &str, table: Table) -> Result<u64, BackendError> {
        let rows = self.enter(token)?;
        let n = match table {
            Table::Locations => rows.locations.len(),
            Table::StorageAreas => rows.areas.len(),
            Table::Categories => rows.categories.len(),
            Table::Items => rows.items.len(),
        };
        Ok(n as u64)
    }

    async fn recent_activity(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<ActivityEntry>, BackendError> {
        let rows = self.enter(token)?;
        Ok(rows
            .activity
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn items_per_location(
        &self,
        token: &str,
    ) -> Result<Vec<LocationItemCount>, BackendError> {
        let rows = self.enter(token)?;
        let mut per_location: HashMap<LocationId, u64> = HashMap::new();
        for item in &rows.items {
            let location = rows
                .categories
                .iter()
                .find(|c| c.id == item.category_id)
                .and_then(|c| rows.areas.iter().find(|a| a.id == c.storage_area_id))
                .map(|a| a.location_id);
            if let Some(location) = location {
                *per_location.entry(location).or_default() += 1;
            }
        }
        Ok(rows
            .locations
            .iter()
            .map(|l| LocationItemCount {
                location_id: Some(l.id),
                location_name: Some(l.name.clone()),
                item_count: per_location.get(&l.id).copied().unwrap_or(0),
            })
            .collect())
    }
}

// =============================================================================
// Recipes
// =============================================================================

/// Recipe source returning a canned list.
#[derive(Default)]
pub struct FakeRecipes {
    pub calls: AtomicUsize,
    pub last_ingredients: Mutex<Vec<String>>,
}

#[async_trait]
impl RecipeSource for FakeRecipes {
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
    ) -> Result<Vec<RecipeSummary>, RecipeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_ingredients.lock().unwrap() = ingredients.to_vec();
        Ok(vec![RecipeSummary {
            id: 716_429,
            title: "Pasta with Garlic".to_string(),
            image: None,
            used_ingredient_count: u32::try_from(ingredients.len()).unwrap(),
            missed_ingredient_count: 1,
            likes: 209,
        }])
    }
}

// =============================================================================
// Router harness
// =============================================================================

/// The application router with fake backends and a one-cookie jar.
pub struct TestApp {
    pub state: AppState,
    pub identity: Arc<FakeIdentity>,
    pub store: Arc<FakeStore>,
    router: Router,
    cookie: Mutex<Option<String>>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_recipes(source: Arc<FakeRecipes>) -> Self {
        Self::build(Some(RecipeService::new(source)))
    }

    fn build(recipes: Option<RecipeService>) -> Self {
        let identity = Arc::new(FakeIdentity::default());
        let store = Arc::new(FakeStore::default());
        let state = AppState::with_backends(
            test_config(),
            identity.clone(),
            store.clone(),
            recipes,
        );
        Self {
            router: pantry_web::app(state.clone()),
            state,
            identity,
            store,
            cookie: Mutex::new(None),
        }
    }

    /// Send a request, attaching and then updating the session cookie.
    pub async fn send(&self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = self.cookie.lock().unwrap().clone() {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default().to_string();
            let value = pair.split_once('=').map_or("", |(_, v)| v);
            let cleared = value.is_empty() || set_cookie.contains("Max-Age=0");
            *self.cookie.lock().unwrap() = (!cleared).then_some(pair);
        }
        response
    }

    pub fn has_cookie(&self) -> bool {
        self.cookie.lock().unwrap().is_some()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, body: &Value) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Sign in as the test user through `/auth/login`.
    pub async fn sign_in(&self) {
        let response = self
            .form(
                "/auth/login",
                &[("email", TEST_EMAIL), ("password", TEST_PASSWORD)],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(self.has_cookie(), "login should set the session cookie");
    }

    /// Create `Home / Pantry / Canned Goods` and return the category id.
    pub async fn seed_hierarchy(&self) -> (i64, i64, i64) {
        let location = body_json(
            self.json(Method::POST, "/api/locations", &serde_json::json!({"name": "Home"}))
                .await,
        )
        .await;
        let location_id = location["id"].as_i64().unwrap();

        let area = body_json(
            self.json(
                Method::POST,
                &format!("/api/locations/{location_id}/storage-areas"),
                &serde_json::json!({"name": "Pantry"}),
            )
            .await,
        )
        .await;
        let area_id = area["id"].as_i64().unwrap();

        let category = body_json(
            self.json(
                Method::POST,
                &format!("/api/storage-areas/{area_id}/categories"),
                &serde_json::json!({"name": "Canned Goods"}),
            )
            .await,
        )
        .await;
        (location_id, area_id, category["id"].as_i64().unwrap())
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
