//! Recipe search through the API, with a canned recipe source.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use pantry_integration_tests::{FakeRecipes, TestApp, body_json};

#[tokio::test]
async fn test_blank_ingredients_are_rejected_without_a_call() {
    let source = Arc::new(FakeRecipes::default());
    let app = TestApp::with_recipes(source.clone());
    app.sign_in().await;

    let response = app.get("/api/recipes?ingredients=%20,%20,").await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeated_search_is_served_from_cache() {
    let source = Arc::new(FakeRecipes::default());
    let app = TestApp::with_recipes(source.clone());
    app.sign_in().await;

    let first = app.get("/api/recipes?ingredients=Garlic,%20pasta").await;
    assert_eq!(first.status(), StatusCode::OK);
    let recipes = body_json(first).await;
    assert_eq!(recipes[0]["title"], "Pasta with Garlic");
    assert_eq!(recipes[0]["used_ingredient_count"], 2);

    let second = app.get("/api/recipes?ingredients=garlic,pasta").await;
    assert_eq!(second.status(), StatusCode::OK);

    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*source.last_ingredients.lock().unwrap(), ["garlic", "pasta"]);
}

#[tokio::test]
async fn test_search_without_api_key_is_unavailable() {
    let app = TestApp::new();
    app.sign_in().await;

    let response = app.get("/api/recipes?ingredients=garlic").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_search_needs_a_session() {
    let source = Arc::new(FakeRecipes::default());
    let app = TestApp::with_recipes(source.clone());

    let response = app.get("/api/recipes?ingredients=garlic").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}
