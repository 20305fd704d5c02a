//! Dashboard aggregates after building a small pantry.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use pantry_integration_tests::{TestApp, body_json};
use serde_json::json;

async fn pantry_with_beans() -> TestApp {
    let app = TestApp::new();
    app.sign_in().await;
    let (_, _, category_id) = app.seed_hierarchy().await;
    let response = app
        .json(
            Method::POST,
            &format!("/api/categories/{category_id}/items"),
            &json!({ "name": "Beans", "quantity": 2, "expiration_date": "2026-12-31" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    app
}

#[tokio::test]
async fn test_counts_cover_every_level() {
    let app = pantry_with_beans().await;

    let response = app.get("/api/stats/counts").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "locations": 1, "storage_areas": 1, "categories": 1, "items": 1 })
    );
}

#[tokio::test]
async fn test_activity_is_newest_first_with_breadcrumbs() {
    let app = pantry_with_beans().await;

    let activity = body_json(app.get("/api/stats/activity").await).await;
    let rows = activity.as_array().unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["entity_type"], "item");
    assert_eq!(rows[0]["action"], "added");
    assert_eq!(rows[0]["breadcrumb"], "Beans in Canned Goods · Pantry @ Home");
    assert_eq!(rows[0]["detail"], "Qty 2 · Exp 2026-12-31");
    assert_eq!(rows[3]["entity_type"], "location");
    assert_eq!(rows[3]["detail"], "Created Home");
}

#[tokio::test]
async fn test_activity_limit_is_clamped() {
    let app = pantry_with_beans().await;

    let one = body_json(app.get("/api/stats/activity?limit=1").await).await;
    assert_eq!(one.as_array().unwrap().len(), 1);

    // Out-of-range limits fall back to sane bounds rather than failing.
    let none = app.get("/api/stats/activity?limit=0").await;
    assert_eq!(none.status(), StatusCode::OK);
    assert!(!body_json(none).await.as_array().unwrap().is_empty());

    let many = app.get("/api/stats/activity?limit=10000").await;
    assert_eq!(many.status(), StatusCode::OK);
    assert_eq!(body_json(many).await.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_items_per_location_chart() {
    let app = pantry_with_beans().await;
    app.json(Method::POST, "/api/locations", &json!({ "name": "Cabin" }))
        .await;

    let counts = body_json(app.get("/api/stats/items-per-location").await).await;

    assert_eq!(counts["rows"].as_array().unwrap().len(), 2);
    // Empty locations stay out of the chart.
    assert_eq!(counts["chart"], json!([{ "name": "Home", "value": 1 }]));
}

#[tokio::test]
async fn test_dashboard_page_bundles_everything() {
    let app = pantry_with_beans().await;

    let response = app.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let dashboard = body_json(response).await;
    assert_eq!(dashboard["totals"]["items"], 1);
    assert_eq!(
        dashboard["recent_activity"][0]["breadcrumb"],
        "Beans in Canned Goods · Pantry @ Home"
    );
    assert_eq!(
        dashboard["items_per_location"]["chart"],
        json!([{ "name": "Home", "value": 1 }])
    );
}
