//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (identity backend reachable)
//!
//! # Pages (guarded)
//! GET  /                               - Dashboard
//! GET  /locations                      - Location list
//! GET  /locations/{id}                 - Location tree (?q=&expiring_within=)
//! GET  /storage-areas/{id}             - Storage area with categories
//! GET  /login                          - Login page data
//!
//! # Auth
//! POST /auth/login                     - Sign in (form), redirect
//! POST /auth/signup                    - Sign up
//! POST /auth/logout                    - Sign out
//! POST /auth/forgot-password           - Send reset email
//! POST /auth/reset-password            - Set new password (session required)
//! POST /api/sync-session               - Store a client-obtained token set
//!
//! # Inventory API (session required)
//! POST   /api/locations
//! PATCH  /api/locations/{id}           DELETE /api/locations/{id}
//! POST   /api/locations/{id}/storage-areas
//! PATCH  /api/storage-areas/{id}       DELETE /api/storage-areas/{id}
//! POST   /api/storage-areas/{id}/categories
//! PATCH  /api/categories/{id}          DELETE /api/categories/{id}
//! POST   /api/categories/{id}/items
//! PATCH  /api/items/{id}               DELETE /api/items/{id}
//! POST   /api/items/bulk-delete
//!
//! # Stats and recipes (session required)
//! GET  /api/stats/counts
//! GET  /api/stats/activity?limit=
//! GET  /api/stats/items-per-location
//! GET  /api/recipes?ingredients=
//! ```

pub mod api;
pub mod auth;
pub mod health;
pub mod pages;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Page routes.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/locations", get(pages::locations))
        .route("/locations/{id}", get(pages::location))
        .route("/storage-areas/{id}", get(pages::storage_area))
        .route("/login", get(pages::login))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/sync-session", post(auth::sync_session))
        // Locations
        .route("/locations", post(api::locations::create))
        .route(
            "/locations/{id}",
            patch(api::locations::rename).delete(api::locations::delete),
        )
        .route(
            "/locations/{id}/storage-areas",
            post(api::locations::create_storage_area),
        )
        // Storage areas
        .route(
            "/storage-areas/{id}",
            patch(api::storage_areas::rename).delete(api::storage_areas::delete),
        )
        .route(
            "/storage-areas/{id}/categories",
            post(api::storage_areas::create_category),
        )
        // Categories
        .route(
            "/categories/{id}",
            patch(api::categories::rename).delete(api::categories::delete),
        )
        .route("/categories/{id}/items", post(api::categories::create_item))
        // Items
        .route("/items/bulk-delete", post(api::items::bulk_delete))
        .route(
            "/items/{id}",
            patch(api::items::update).delete(api::items::delete),
        )
        // Stats
        .route("/stats/counts", get(api::stats::counts))
        .route("/stats/activity", get(api::stats::activity))
        .route(
            "/stats/items-per-location",
            get(api::stats::items_per_location),
        )
        // Recipes
        .route("/recipes", get(api::recipes::search))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(page_routes())
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
