//! Create, rename, update and delete across the hierarchy, through the JSON API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use pantry_core::{Confirmed, ItemId, LocationTree, Mutation, OptimisticTree};
use pantry_integration_tests::{TestApp, body_json};
use serde_json::json;

#[tokio::test]
async fn test_blank_name_is_rejected_without_backend_call() {
    let app = TestApp::new();
    app.sign_in().await;

    let response = app
        .json(Method::POST, "/api/locations", &json!({ "name": "   " }))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.store.call_count(), 0);
}

#[tokio::test]
async fn test_create_chain_normalizes_item_input() {
    let app = TestApp::new();
    app.sign_in().await;
    let (location_id, _, category_id) = app.seed_hierarchy().await;

    let response = app
        .json(
            Method::POST,
            &format!("/api/categories/{category_id}/items"),
            &json!({ "name": "  Beans ", "quantity": "3", "expiration_date": "" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let item = body_json(response).await;
    assert_eq!(item["name"], "Beans");
    assert_eq!(item["quantity"], 3);
    assert!(item["expiration_date"].is_null());

    let tree: LocationTree =
        serde_json::from_value(body_json(app.get(&format!("/locations/{location_id}")).await).await)
            .unwrap();
    assert_eq!(tree.location.name, "Home");
    assert_eq!(tree.areas[0].area.name, "Pantry");
    assert_eq!(tree.areas[0].categories[0].category.name, "Canned Goods");
    assert_eq!(tree.item_count(), 1);
}

#[tokio::test]
async fn test_location_page_filters_items() {
    let app = TestApp::new();
    app.sign_in().await;
    let (location_id, _, category_id) = app.seed_hierarchy().await;
    for name in ["Black Beans", "Tomatoes", "Kidney Beans"] {
        app.json(
            Method::POST,
            &format!("/api/categories/{category_id}/items"),
            &json!({ "name": name, "quantity": 1 }),
        )
        .await;
    }

    let tree: LocationTree = serde_json::from_value(
        body_json(app.get(&format!("/locations/{location_id}?q=beans")).await).await,
    )
    .unwrap();

    let mut names: Vec<_> = tree.items().map(|i| i.name.clone()).collect();
    names.sort();
    assert_eq!(names, ["Black Beans", "Kidney Beans"]);
}

#[tokio::test]
async fn test_location_page_accepts_empty_filter_form() {
    let app = TestApp::new();
    app.sign_in().await;
    let (location_id, _, category_id) = app.seed_hierarchy().await;
    app.json(
        Method::POST,
        &format!("/api/categories/{category_id}/items"),
        &json!({ "name": "Beans", "quantity": 1 }),
    )
    .await;

    let response = app
        .get(&format!("/locations/{location_id}?q=&expiring_within="))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let tree: LocationTree = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(tree.item_count(), 1);
}

#[tokio::test]
async fn test_blank_rename_is_a_no_op() {
    let app = TestApp::new();
    app.sign_in().await;
    let (location_id, _, _) = app.seed_hierarchy().await;
    let calls_before = app.store.call_count();

    let response = app
        .json(
            Method::PATCH,
            &format!("/api/locations/{location_id}"),
            &json!({ "name": "" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "unchanged": true }));
    assert_eq!(app.store.call_count(), calls_before);
}

#[tokio::test]
async fn test_rename_returns_updated_row() {
    let app = TestApp::new();
    app.sign_in().await;
    let (_, area_id, _) = app.seed_hierarchy().await;

    let response = app
        .json(
            Method::PATCH,
            &format!("/api/storage-areas/{area_id}"),
            &json!({ "name": " Top Shelf " }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Top Shelf");
}

#[tokio::test]
async fn test_empty_item_patch_is_rejected() {
    let app = TestApp::new();
    app.sign_in().await;
    let (_, _, category_id) = app.seed_hierarchy().await;
    let item = body_json(
        app.json(
            Method::POST,
            &format!("/api/categories/{category_id}/items"),
            &json!({ "name": "Beans" }),
        )
        .await,
    )
    .await;

    let response = app
        .json(
            Method::PATCH,
            &format!("/api/items/{}", item["id"]),
            &json!({ "name": "  " }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "no valid fields to update" })
    );
}

#[tokio::test]
async fn test_item_patch_clears_expiration() {
    let app = TestApp::new();
    app.sign_in().await;
    let (_, _, category_id) = app.seed_hierarchy().await;
    let item = body_json(
        app.json(
            Method::POST,
            &format!("/api/categories/{category_id}/items"),
            &json!({ "name": "Milk", "quantity": 1, "expiration_date": "2026-11-01" }),
        )
        .await,
    )
    .await;
    assert_eq!(item["expiration_date"], "2026-11-01");

    let response = app
        .json(
            Method::PATCH,
            &format!("/api/items/{}", item["id"]),
            &json!({ "expiration_date": null, "quantity": "2" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert!(updated["expiration_date"].is_null());
    assert_eq!(updated["quantity"], 2);
    assert_eq!(updated["name"], "Milk");
}

#[tokio::test]
async fn test_item_under_missing_category_is_404() {
    let app = TestApp::new();
    app.sign_in().await;

    let response = app
        .json(
            Method::POST,
            "/api/categories/999/items",
            &json!({ "name": "Beans", "quantity": 1 }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "category not found" })
    );
}

#[tokio::test]
async fn test_deleting_location_removes_everything_below() {
    let app = TestApp::new();
    app.sign_in().await;
    let (location_id, area_id, category_id) = app.seed_hierarchy().await;
    app.json(
        Method::POST,
        &format!("/api/categories/{category_id}/items"),
        &json!({ "name": "Beans" }),
    )
    .await;

    let response = app.delete(&format!("/api/locations/{location_id}")).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        app.get(&format!("/locations/{location_id}")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/storage-areas/{area_id}")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.store.item_count(), 0);
    assert_eq!(
        app.delete(&format!("/api/locations/{location_id}"))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_bulk_delete_with_partial_failure() {
    let app = TestApp::new();
    app.sign_in().await;
    let (location_id, _, category_id) = app.seed_hierarchy().await;

    let mut ids = Vec::new();
    for name in ["Beans", "Corn", "Peas"] {
        let item = body_json(
            app.json(
                Method::POST,
                &format!("/api/categories/{category_id}/items"),
                &json!({ "name": name, "quantity": 1 }),
            )
            .await,
        )
        .await;
        ids.push(ItemId::new(item["id"].as_i64().unwrap()));
    }
    let (beans, corn, peas) = (ids[0], ids[1], ids[2]);
    app.store.fail_delete_of(corn);

    // Remove all three locally, then reconcile with the server's report.
    let tree: LocationTree = serde_json::from_value(
        body_json(app.get(&format!("/locations/{location_id}")).await).await,
    )
    .unwrap();
    let mut local = OptimisticTree::new(tree);
    let tickets: Vec<_> = ids
        .iter()
        .map(|&id| (id, local.begin(Mutation::RemoveItem { id }).unwrap()))
        .collect();
    assert_eq!(local.tree().item_count(), 0);

    let response = app
        .json(
            Method::POST,
            "/api/items/bulk-delete",
            &json!({ "ids": [beans, corn, peas] }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["deleted"], json!([beans, peas]));
    assert_eq!(report["failed"][0]["id"], json!(corn));
    assert_eq!(report["failed"][0]["error"], "failed to delete item");

    let deleted: Vec<ItemId> = serde_json::from_value(report["deleted"].clone()).unwrap();
    for (id, ticket) in tickets {
        if deleted.contains(&id) {
            local.commit(ticket, Confirmed::Removed).unwrap();
        } else {
            local.rollback(ticket);
        }
    }

    assert_eq!(local.pending_count(), 0);
    let remaining: Vec<_> = local.tree().items().map(|i| i.id).collect();
    assert_eq!(remaining, [corn]);
    assert_eq!(app.store.item_count(), 1);
}
