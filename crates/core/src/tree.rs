//! A location with its full storage hierarchy.
//!
//! [`LocationTree`] is what the location page renders and what optimistic
//! updates are applied to. Removing a node always removes its subtree.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{AreaNode, Category, CategoryNode, Item, Location};
use crate::types::{CategoryId, ItemId, StorageAreaId, days_until};

/// A location and everything stored in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTree {
    pub location: Location,
    pub areas: Vec<AreaNode>,
}

/// Item filter for the location page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemFilter {
    /// Case-insensitive substring matched against item and category names.
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    /// Only keep items expiring within this many days (expired items included).
    #[serde(default, deserialize_with = "blank_as_none")]
    pub expiring_within: Option<i64>,
}

/// An empty form field means "no limit".
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(days) => days.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl ItemFilter {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// True when the filter would keep everything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.needle().is_none() && self.expiring_within.is_none()
    }

    fn item_matches(&self, needle: Option<&str>, item: &Item, today: NaiveDate) -> bool {
        let name_ok = needle.is_none_or(|n| item.name.to_lowercase().contains(n));
        let expiry_ok = self.expiring_within.is_none_or(|within| {
            item.expiration_date
                .is_some_and(|date| days_until(date, today) <= within)
        });
        name_ok && expiry_ok
    }
}

impl LocationTree {
    #[must_use]
    pub const fn new(location: Location, areas: Vec<AreaNode>) -> Self {
        Self { location, areas }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    #[must_use]
    pub fn area(&self, id: StorageAreaId) -> Option<&AreaNode> {
        self.areas.iter().find(|a| a.area.id == id)
    }

    pub fn area_mut(&mut self, id: StorageAreaId) -> Option<&mut AreaNode> {
        self.areas.iter_mut().find(|a| a.area.id == id)
    }

    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&CategoryNode> {
        self.areas
            .iter()
            .flat_map(|a| &a.categories)
            .find(|c| c.category.id == id)
    }

    pub fn category_mut(&mut self, id: CategoryId) -> Option<&mut CategoryNode> {
        self.areas
            .iter_mut()
            .flat_map(|a| &mut a.categories)
            .find(|c| c.category.id == id)
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.areas
            .iter_mut()
            .flat_map(|a| &mut a.categories)
            .flat_map(|c| &mut c.items)
            .find(|i| i.id == id)
    }

    /// Every item in the tree, in display order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.areas
            .iter()
            .flat_map(|a| &a.categories)
            .flat_map(|c| &c.items)
    }

    #[must_use]
    pub fn category_count(&self) -> usize {
        self.areas.iter().map(|a| a.categories.len()).sum()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Insert an area at `index`, clamped to the end.
    pub fn insert_area(&mut self, index: usize, node: AreaNode) {
        let index = index.min(self.areas.len());
        self.areas.insert(index, node);
    }

    /// Remove an area and its subtree. Returns the position it held.
    pub fn remove_area(&mut self, id: StorageAreaId) -> Option<(usize, AreaNode)> {
        let index = self.areas.iter().position(|a| a.area.id == id)?;
        Some((index, self.areas.remove(index)))
    }

    /// Insert a category into its area at `index`, clamped to the end.
    ///
    /// Returns the category back if its area is not in the tree.
    pub fn insert_category(&mut self, index: usize, node: CategoryNode) -> Result<(), CategoryNode> {
        let Some(area) = self.area_mut(node.category.storage_area_id) else {
            return Err(node);
        };
        let index = index.min(area.categories.len());
        area.categories.insert(index, node);
        Ok(())
    }

    /// Remove a category and its items. Returns the position it held.
    pub fn remove_category(&mut self, id: CategoryId) -> Option<(usize, CategoryNode)> {
        self.areas.iter_mut().find_map(|area| {
            let index = area.categories.iter().position(|c| c.category.id == id)?;
            Some((index, area.categories.remove(index)))
        })
    }

    /// Insert an item into its category at `index`, clamped to the end.
    ///
    /// Returns the item back if its category is not in the tree.
    pub fn insert_item(&mut self, index: usize, item: Item) -> Result<(), Item> {
        let Some(category) = self.category_mut(item.category_id) else {
            return Err(item);
        };
        let index = index.min(category.items.len());
        category.items.insert(index, item);
        Ok(())
    }

    /// Remove one item. Returns the position it held.
    pub fn remove_item(&mut self, id: ItemId) -> Option<(usize, Item)> {
        self.areas
            .iter_mut()
            .flat_map(|a| &mut a.categories)
            .find_map(|category| {
                let index = category.items.iter().position(|i| i.id == id)?;
                Some((index, category.items.remove(index)))
            })
    }

    /// Replace a category's row, keeping its items.
    pub fn set_category(&mut self, category: Category) -> bool {
        match self.category_mut(category.id) {
            Some(node) => {
                node.category = category;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// A copy of the tree reduced to what `filter` matches.
    ///
    /// A category stays visible if its own name matches the search text or
    /// any of its items match. Visible categories only list matching items.
    /// Areas are always kept so they can still be edited.
    #[must_use]
    pub fn filtered(&self, filter: &ItemFilter, today: NaiveDate) -> Self {
        if filter.is_noop() {
            return self.clone();
        }
        let needle = filter.needle();
        let needle = needle.as_deref();

        let areas = self
            .areas
            .iter()
            .map(|area| {
                let categories = area
                    .categories
                    .iter()
                    .filter_map(|node| {
                        let items: Vec<Item> = node
                            .items
                            .iter()
                            .filter(|i| filter.item_matches(needle, i, today))
                            .cloned()
                            .collect();
                        let name_match =
                            needle.is_none_or(|n| node.category.name.to_lowercase().contains(n));
                        (name_match || !items.is_empty()).then(|| CategoryNode {
                            category: node.category.clone(),
                            items,
                        })
                    })
                    .collect();
                AreaNode {
                    area: area.area.clone(),
                    categories,
                }
            })
            .collect();

        Self {
            location: self.location.clone(),
            areas,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::models::StorageArea;
    use crate::types::{LocationId, Quantity};

    pub fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    pub fn item(id: i64, category: i64, name: &str, expires: Option<(i32, u32, u32)>) -> Item {
        Item {
            id: ItemId::new(id),
            name: name.to_owned(),
            quantity: Quantity::new(1),
            expiration_date: expires.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            category_id: CategoryId::new(category),
            created_at: None,
        }
    }

    pub fn category(id: i64, area: i64, name: &str, items: Vec<Item>) -> CategoryNode {
        CategoryNode {
            category: Category {
                id: CategoryId::new(id),
                name: name.to_owned(),
                storage_area_id: StorageAreaId::new(area),
                created_at: epoch(),
            },
            items,
        }
    }

    pub fn area(id: i64, name: &str, categories: Vec<CategoryNode>) -> AreaNode {
        AreaNode {
            area: StorageArea {
                id: StorageAreaId::new(id),
                name: name.to_owned(),
                location_id: LocationId::new(1),
                created_at: epoch(),
            },
            categories,
        }
    }

    /// Home / Pantry / {Canned Goods: Beans, Soup; Grains: Rice}
    pub fn home() -> LocationTree {
        LocationTree::new(
            Location {
                id: LocationId::new(1),
                name: "Home".to_owned(),
                created_at: epoch(),
            },
            vec![area(
                10,
                "Pantry",
                vec![
                    category(
                        100,
                        10,
                        "Canned Goods",
                        vec![
                            item(1000, 100, "Beans", Some((2025, 1, 5))),
                            item(1001, 100, "Tomato soup", None),
                        ],
                    ),
                    category(101, 10, "Grains", vec![item(1002, 101, "Rice", Some((2025, 3, 1)))]),
                ],
            )],
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn search(text: &str) -> ItemFilter {
        ItemFilter {
            search: Some(text.to_owned()),
            expiring_within: None,
        }
    }

    #[test]
    fn test_lookups_and_counts() {
        let tree = home();
        assert_eq!(tree.category_count(), 2);
        assert_eq!(tree.item_count(), 3);
        assert_eq!(tree.item(ItemId::new(1002)).map(|i| i.name.as_str()), Some("Rice"));
        assert!(tree.category(CategoryId::new(999)).is_none());
    }

    #[test]
    fn test_remove_area_removes_subtree() {
        let mut tree = home();
        let (index, node) = tree.remove_area(StorageAreaId::new(10)).unwrap();
        assert_eq!(index, 0);
        assert_eq!(node.categories.len(), 2);
        assert_eq!(tree.item_count(), 0);
        assert!(tree.item(ItemId::new(1000)).is_none());
    }

    #[test]
    fn test_blank_expiry_window_means_no_limit() {
        let filter: ItemFilter =
            serde_json::from_str(r#"{"q": "", "expiring_within": " "}"#).unwrap();
        assert_eq!(filter.expiring_within, None);
        assert!(filter.is_noop());

        let filter: ItemFilter = serde_json::from_str(r#"{"expiring_within": "7"}"#).unwrap();
        assert_eq!(filter.expiring_within, Some(7));

        assert!(serde_json::from_str::<ItemFilter>(r#"{"expiring_within": "soon"}"#).is_err());
    }

    #[test]
    fn test_insert_item_into_missing_category_returns_item() {
        let mut tree = home();
        let orphan = item(5, 777, "Lost", None);
        assert!(tree.insert_item(0, orphan).is_err());
        assert_eq!(tree.item_count(), 3);
    }

    #[test]
    fn test_search_matches_item_names_case_insensitively() {
        let tree = home().filtered(&search("  BEAN "), today());
        let cats = &tree.areas[0].categories;
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].category.name, "Canned Goods");
        assert_eq!(cats[0].items.len(), 1);
    }

    #[test]
    fn test_category_name_match_keeps_category_visible() {
        let tree = home().filtered(&search("grain"), today());
        let cats = &tree.areas[0].categories;
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].category.name, "Grains");
        // "grain" does not match "Rice" itself.
        assert!(cats[0].items.is_empty());
    }

    #[test]
    fn test_expiring_filter_excludes_undated_items() {
        let filter = ItemFilter {
            search: None,
            expiring_within: Some(7),
        };
        let tree = home().filtered(&filter, today());
        let names: Vec<_> = tree.items().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Beans"]);
        assert_eq!(tree.areas.len(), 1);
    }

    #[test]
    fn test_blank_search_is_noop() {
        let tree = home();
        assert_eq!(tree.filtered(&search("   "), today()), tree);
    }
}
