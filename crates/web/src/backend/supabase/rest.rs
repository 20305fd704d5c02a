//! PostgREST data client.

use std::time::Duration;

use async_trait::async_trait;
use pantry_core::{
    ActivityEntry, AreaNode, Category, CategoryId, EntityName, Item, ItemId, ItemPatch, Location,
    LocationId, LocationItemCount, LocationTree, NewItem, StorageArea, StorageAreaDetail,
    StorageAreaId,
};
use reqwest::Method;
use reqwest::header::CONTENT_RANGE;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{build_client, endpoint, error_from_response, read_json};
use crate::backend::{BackendError, PantryStore, Table};

/// Nested select for a location's areas, categories and items.
const AREA_TREE_SELECT: &str = "id,name,location_id,created_at,\
categories:storage_categories!fk_storage_area(id,name,storage_area_id,created_at,\
items:items!fk_items_category(id,name,quantity,expiration_date,category_id))";

/// Query for every area of a location, oldest first. Items have no
/// timestamp column, so they are listed by id.
fn area_tree_params(id: LocationId) -> [(&'static str, String); 5] {
    [
        ("select", AREA_TREE_SELECT.to_string()),
        ("location_id", format!("eq.{id}")),
        ("order", "created_at.asc".to_string()),
        ("categories.order", "created_at.asc".to_string()),
        ("categories.items.order", "id.asc".to_string()),
    ]
}

/// A storage area row with its location embedded.
#[derive(Debug, Deserialize)]
struct AreaWithLocation {
    #[serde(flatten)]
    area: StorageArea,
    location: Location,
}

/// PostgREST client for `<project>/rest/v1`.
#[derive(Clone)]
pub struct SupabaseRest {
    client: reqwest::Client,
    base_url: String,
}

impl SupabaseRest {
    /// Create a new data client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        config: &crate::config::SupabaseConfig,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(config, timeout)?,
            base_url: endpoint(config, "rest/v1"),
        })
    }

    fn request(&self, method: Method, relation: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{relation}", self.base_url))
            .bearer_auth(token)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        token: &str,
        relation: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let response = self
            .request(Method::GET, relation, token)
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }

    /// Run a write that returns the affected rows, and take the first one.
    async fn write_one<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<T> = read_json(response).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }

    async fn insert<T: DeserializeOwned>(
        &self,
        token: &str,
        table: Table,
        body: serde_json::Value,
    ) -> Result<T, BackendError> {
        let request = self
            .request(Method::POST, table.name(), token)
            .query(&[("select", "*")])
            .json(&body);
        self.write_one(request).await
    }

    async fn update<T: DeserializeOwned>(
        &self,
        token: &str,
        table: Table,
        id: i64,
        body: &impl serde::Serialize,
    ) -> Result<T, BackendError> {
        let request = self
            .request(Method::PATCH, table.name(), token)
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .json(body);
        self.write_one(request).await
    }

    async fn rename<T: DeserializeOwned>(
        &self,
        token: &str,
        table: Table,
        id: i64,
        name: &EntityName,
    ) -> Result<T, BackendError> {
        self.update(token, table, id, &serde_json::json!({ "name": name }))
            .await
    }
}

/// Total from a `Content-Range` header such as `0-24/25` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl PantryStore for SupabaseRest {
    async fn list_locations(&self, token: &str) -> Result<Vec<Location>, BackendError> {
        self.select(
            token,
            Table::Locations.name(),
            &[
                ("select", "id,name,created_at".to_string()),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn location_tree(
        &self,
        token: &str,
        id: LocationId,
    ) -> Result<Option<LocationTree>, BackendError> {
        let locations: Vec<Location> = self
            .select(
                token,
                Table::Locations.name(),
                &[
                    ("select", "id,name,created_at".to_string()),
                    ("id", format!("eq.{id}")),
                ],
            )
            .await?;
        let Some(location) = locations.into_iter().next() else {
            return Ok(None);
        };

        let areas: Vec<AreaNode> = self
            .select(token, Table::StorageAreas.name(), &area_tree_params(id))
            .await?;

        Ok(Some(LocationTree::new(location, areas)))
    }

    async fn storage_area_detail(
        &self,
        token: &str,
        id: StorageAreaId,
    ) -> Result<Option<StorageAreaDetail>, BackendError> {
        let rows: Vec<AreaWithLocation> = self
            .select(
                token,
                Table::StorageAreas.name(),
                &[
                    (
                        "select",
                        "id,name,location_id,created_at,location:locations(id,name,created_at)"
                            .to_string(),
                    ),
                    ("id", format!("eq.{id}")),
                ],
            )
            .await?;
        let Some(AreaWithLocation { area, location }) = rows.into_iter().next() else {
            return Ok(None);
        };

        let categories: Vec<Category> = self
            .select(
                token,
                Table::Categories.name(),
                &[
                    ("select", "id,name,storage_area_id,created_at".to_string()),
                    ("storage_area_id", format!("eq.{id}")),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await?;

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
        self.insert(token, Table::Locations, serde_json::json!({ "name": name }))
            .await
    }

    async fn rename_location(
        &self,
        token: &str,
        id: LocationId,
        name: &EntityName,
    ) -> Result<Location, BackendError> {
        self.rename(token, Table::Locations, id.as_i64(), name).await
    }

    async fn insert_storage_area(
        &self,
        token: &str,
        location_id: LocationId,
        name: &EntityName,
    ) -> Result<StorageArea, BackendError> {
        let body = serde_json::json!({ "name": name, "location_id": location_id });
        self.insert(token, Table::StorageAreas, body).await
    }

    async fn rename_storage_area(
        &self,
        token: &str,
        id: StorageAreaId,
        name: &EntityName,
    ) -> Result<StorageArea, BackendError> {
        self.rename(token, Table::StorageAreas, id.as_i64(), name)
            .await
    }

    async fn insert_category(
        &self,
        token: &str,
        storage_area_id: StorageAreaId,
        name: &EntityName,
    ) -> Result<Category, BackendError> {
        let body = serde_json::json!({ "name": name, "storage_area_id": storage_area_id });
        self.insert(token, Table::Categories, body).await
    }

    async fn rename_category(
        &self,
        token: &str,
        id: CategoryId,
        name: &EntityName,
    ) -> Result<Category, BackendError> {
        self.rename(token, Table::Categories, id.as_i64(), name).await
    }

    async fn insert_item(
        &self,
        token: &str,
        category_id: CategoryId,
        item: &NewItem,
    ) -> Result<Item, BackendError> {
        let body = serde_json::json!({
            "name": item.name,
            "quantity": item.quantity,
            "expiration_date": item.expiration_date,
            "category_id": category_id,
        });
        self.insert(token, Table::Items, body).await
    }

    async fn update_item(
        &self,
        token: &str,
        id: ItemId,
        patch: &ItemPatch,
    ) -> Result<Item, BackendError> {
        self.update(token, Table::Items, id.as_i64(), patch).await
    }

    async fn delete(&self, token: &str, table: Table, id: i64) -> Result<(), BackendError> {
        let request = self
            .request(Method::DELETE, table.name(), token)
            .query(&[("id", format!("eq.{id}")), ("select", "id".to_string())]);
        let _: serde_json::Value = self.write_one(request).await?;
        Ok(())
    }

    async fn count(&self, token: &str, table: Table) -> Result<u64, BackendError> {
        let response = self
            .request(Method::HEAD, table.name(), token)
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| BackendError::Parse("missing Content-Range count".to_string()))
    }

    async fn recent_activity(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<ActivityEntry>, BackendError> {
        self.select(
            token,
            "recent_activity",
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn items_per_location(
        &self,
        token: &str,
    ) -> Result<Vec<LocationItemCount>, BackendError> {
        self.select(token, "items_per_location", &[("select", "*".to_string())])
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/25"), Some(25));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_area_tree_select_embeds_items() {
        assert!(AREA_TREE_SELECT.contains("categories:storage_categories!fk_storage_area("));
        assert!(AREA_TREE_SELECT.contains("items:items!fk_items_category("));
        assert!(!AREA_TREE_SELECT.contains(' '));
    }

    #[test]
    fn test_area_tree_items_have_no_timestamp() {
        let items = AREA_TREE_SELECT.split("items:items").nth(1).unwrap();
        assert!(!items.contains("created_at"));

        let params = area_tree_params(LocationId::new(7));
        assert!(params.contains(&("location_id", "eq.7".to_string())));
        assert!(params.contains(&("categories.items.order", "id.asc".to_string())));
    }
}
