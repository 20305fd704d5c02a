//! Rows of the four-level pantry hierarchy, as returned by the data backend.
//!
//! ```text
//! Location ──< StorageArea ──< Category ──< Item
//! ```
//!
//! The nested `*Node` types mirror a single relational query that fetches a
//! location's areas, their categories and their items in one round trip.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ItemId, LocationId, Quantity, StorageAreaId};

/// A physical place, such as a house. Root of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A storage unit within a location, such as a pantry shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageArea {
    pub id: StorageAreaId,
    pub name: String,
    pub location_id: LocationId,
    pub created_at: DateTime<Utc>,
}

/// A grouping of items within a storage area, such as "Canned Goods".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub storage_area_id: StorageAreaId,
    pub created_at: DateTime<Utc>,
}

/// A tracked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub quantity: Quantity,
    pub expiration_date: Option<NaiveDate>,
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A category together with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A storage area together with its categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaNode {
    #[serde(flatten)]
    pub area: StorageArea,
    #[serde(default)]
    pub categories: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Wrap a freshly created category with no items.
    #[must_use]
    pub const fn empty(category: Category) -> Self {
        Self {
            category,
            items: Vec::new(),
        }
    }
}

impl AreaNode {
    /// Wrap a freshly created storage area with no categories.
    #[must_use]
    pub const fn empty(area: StorageArea) -> Self {
        Self {
            area,
            categories: Vec::new(),
        }
    }
}

/// A storage area page: the area, its location and its categories (without items).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAreaDetail {
    pub area: StorageArea,
    pub location: Location,
    pub categories: Vec<Category>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_area_deserializes() {
        let json = r#"{
            "id": 3,
            "name": "Pantry",
            "location_id": 1,
            "created_at": "2025-01-01T00:00:00Z",
            "categories": [{
                "id": 9,
                "name": "Canned Goods",
                "storage_area_id": 3,
                "created_at": "2025-01-01T00:00:00Z",
                "items": [{
                    "id": 11,
                    "name": "Beans",
                    "quantity": 3,
                    "expiration_date": "2025-01-01",
                    "category_id": 9
                }]
            }]
        }"#;

        let node: AreaNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.area.name, "Pantry");
        assert_eq!(node.categories.len(), 1);
        let item = &node.categories[0].items[0];
        assert_eq!(item.quantity, Quantity::new(3));
        assert!(item.created_at.is_none());
    }

    #[test]
    fn test_missing_children_default_to_empty() {
        let json = r#"{"id":3,"name":"Shelf","location_id":1,"created_at":"2025-01-01T00:00:00Z"}"#;
        let node: AreaNode = serde_json::from_str(json).unwrap();
        assert!(node.categories.is_empty());
    }
}
