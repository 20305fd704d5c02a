//! Create, rename, update and delete across the pantry hierarchy.
//!
//! Input is validated before any backend call: a blank name on create or an
//! item patch with nothing in it never reaches the network. A blank name on
//! rename is a no-op rather than an error.

use chrono::NaiveDate;
use pantry_core::{
    Category, CategoryId, EntityName, Item, ItemFilter, ItemId, ItemPatchInput, Location,
    LocationId, LocationTree, NewItemInput, PatchError, StorageArea, StorageAreaDetail,
    StorageAreaId,
};
use serde::Serialize;
use thiserror::Error;

use crate::backend::{BackendError, PantryStore, Table};
use crate::error::add_breadcrumb;

/// Errors from an entity sync operation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The input was rejected locally.
    #[error(transparent)]
    Validation(#[from] PatchError),

    /// The entity, or the parent it should be created under, does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The backend call failed.
    #[error(transparent)]
    Backend(BackendError),
}

impl SyncError {
    /// Classify a backend error for an operation on a row of `table`.
    fn from_backend(err: BackendError, table: Table) -> Self {
        match err {
            BackendError::NotFound => Self::NotFound(table.label()),
            other => Self::Backend(other),
        }
    }

    /// Classify a backend error for an insert under a row of `parent`.
    ///
    /// PostgREST answers a foreign-key violation with 409, which for an insert
    /// means the parent row is gone.
    fn from_insert(err: BackendError, parent: Table) -> Self {
        match err {
            BackendError::Api { status: 409, .. } => Self::NotFound(parent.label()),
            other => Self::from_backend(other, parent),
        }
    }
}

/// Outcome of a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rename<T> {
    Renamed(T),
    /// The new name was blank, nothing was sent.
    Unchanged,
}

/// Result of a bulk item delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkDeleteReport {
    pub deleted: Vec<ItemId>,
    pub failed: Vec<BulkDeleteFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkDeleteFailure {
    pub id: ItemId,
    pub error: String,
}

/// Pantry operations on behalf of one signed-in user.
pub struct PantryService<'a> {
    store: &'a dyn PantryStore,
    token: &'a str,
}

impl<'a> PantryService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn PantryStore, token: &'a str) -> Self {
        Self { store, token }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All locations, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Backend`] if the backend call fails.
    pub async fn list_locations(&self) -> Result<Vec<Location>, SyncError> {
        self.store
            .list_locations(self.token)
            .await
            .map_err(SyncError::Backend)
    }

    /// A location's full tree, filtered for display.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the location does not exist.
    pub async fn location_tree(
        &self,
        id: LocationId,
        filter: &ItemFilter,
        today: NaiveDate,
    ) -> Result<LocationTree, SyncError> {
        let tree = self
            .store
            .location_tree(self.token, id)
            .await
            .map_err(|e| SyncError::from_backend(e, Table::Locations))?
            .ok_or(SyncError::NotFound(Table::Locations.label()))?;

        if filter.is_noop() {
            Ok(tree)
        } else {
            Ok(tree.filtered(filter, today))
        }
    }

    /// A storage area with its location and categories.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the area does not exist.
    pub async fn storage_area(&self, id: StorageAreaId) -> Result<StorageAreaDetail, SyncError> {
        self.store
            .storage_area_detail(self.token, id)
            .await
            .map_err(|e| SyncError::from_backend(e, Table::StorageAreas))?
            .ok_or(SyncError::NotFound(Table::StorageAreas.label()))
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for a blank name.
    pub async fn create_location(&self, name: &str) -> Result<Location, SyncError> {
        let name = EntityName::parse(name).map_err(PatchError::from)?;
        let location = self
            .store
            .insert_location(self.token, &name)
            .await
            .map_err(SyncError::Backend)?;

        tracing::info!(location_id = %location.id, "Location created");
        add_breadcrumb("pantry", "Created location", Some(&[("name", name.as_str())]));
        Ok(location)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the location does not exist.
    pub async fn rename_location(
        &self,
        id: LocationId,
        name: &str,
    ) -> Result<Rename<Location>, SyncError> {
        let Some(name) = EntityName::parse_optional(name) else {
            return Ok(Rename::Unchanged);
        };
        let location = self
            .store
            .rename_location(self.token, id, &name)
            .await
            .map_err(|e| SyncError::from_backend(e, Table::Locations))?;

        tracing::info!(location_id = %id, "Location renamed");
        Ok(Rename::Renamed(location))
    }

    /// Delete a location. The backend removes its areas, categories and items.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the location does not exist.
    pub async fn delete_location(&self, id: LocationId) -> Result<(), SyncError> {
        self.delete(Table::Locations, id.as_i64()).await
    }

    // =========================================================================
    // Storage areas
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for a blank name and
    /// [`SyncError::NotFound`] if the location does not exist.
    pub async fn create_storage_area(
        &self,
        location_id: LocationId,
        name: &str,
    ) -> Result<StorageArea, SyncError> {
        let name = EntityName::parse(name).map_err(PatchError::from)?;
        let area = self
            .store
            .insert_storage_area(self.token, location_id, &name)
            .await
            .map_err(|e| SyncError::from_insert(e, Table::Locations))?;

        tracing::info!(storage_area_id = %area.id, %location_id, "Storage area created");
        add_breadcrumb("pantry", "Created storage area", Some(&[("name", name.as_str())]));
        Ok(area)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the area does not exist.
    pub async fn rename_storage_area(
        &self,
        id: StorageAreaId,
        name: &str,
    ) -> Result<Rename<StorageArea>, SyncError> {
        let Some(name) = EntityName::parse_optional(name) else {
            return Ok(Rename::Unchanged);
        };
        let area = self
            .store
            .rename_storage_area(self.token, id, &name)
            .await
            .map_err(|e| SyncError::from_backend(e, Table::StorageAreas))?;

        tracing::info!(storage_area_id = %id, "Storage area renamed");
        Ok(Rename::Renamed(area))
    }

    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the area does not exist.
    pub async fn delete_storage_area(&self, id: StorageAreaId) -> Result<(), SyncError> {
        self.delete(Table::StorageAreas, id.as_i64()).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for a blank name and
    /// [`SyncError::NotFound`] if the area does not exist.
    pub async fn create_category(
        &self,
        storage_area_id: StorageAreaId,
        name: &str,
    ) -> Result<Category, SyncError> {
        let name = EntityName::parse(name).map_err(PatchError::from)?;
        let category = self
            .store
            .insert_category(self.token, storage_area_id, &name)
            .await
            .map_err(|e| SyncError::from_insert(e, Table::StorageAreas))?;

        tracing::info!(category_id = %category.id, %storage_area_id, "Category created");
        add_breadcrumb("pantry", "Created category", Some(&[("name", name.as_str())]));
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the category does not exist.
    pub async fn rename_category(
        &self,
        id: CategoryId,
        name: &str,
    ) -> Result<Rename<Category>, SyncError> {
        let Some(name) = EntityName::parse_optional(name) else {
            return Ok(Rename::Unchanged);
        };
        let category = self
            .store
            .rename_category(self.token, id, &name)
            .await
            .map_err(|e| SyncError::from_backend(e, Table::Categories))?;

        tracing::info!(category_id = %id, "Category renamed");
        Ok(Rename::Renamed(category))
    }

    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the category does not exist.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), SyncError> {
        self.delete(Table::Categories, id.as_i64()).await
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] for a blank name or bad date, and
    /// [`SyncError::NotFound`] if the category does not exist.
    pub async fn create_item(
        &self,
        category_id: CategoryId,
        input: &NewItemInput,
    ) -> Result<Item, SyncError> {
        let item = input.normalize()?;
        let created = self
            .store
            .insert_item(self.token, category_id, &item)
            .await
            .map_err(|e| SyncError::from_insert(e, Table::Categories))?;

        tracing::info!(item_id = %created.id, %category_id, quantity = %created.quantity, "Item created");
        add_breadcrumb("pantry", "Added item", Some(&[("name", item.name.as_str())]));
        Ok(created)
    }

    /// Apply a partial update to an item.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Validation`] when the patch has no usable fields or
    /// a bad date, and [`SyncError::NotFound`] if the item does not exist.
    pub async fn update_item(
        &self,
        id: ItemId,
        input: &ItemPatchInput,
    ) -> Result<Item, SyncError> {
        let patch = input.normalize()?;
        let item = self
            .store
            .update_item(self.token, id, &patch)
            .await
            .map_err(|e| SyncError::from_backend(e, Table::Items))?;

        tracing::info!(item_id = %id, "Item updated");
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns [`SyncError::NotFound`] if the item does not exist.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), SyncError> {
        self.delete(Table::Items, id.as_i64()).await
    }

    /// Delete items one at a time, in order, carrying on past failures.
    pub async fn bulk_delete_items(&self, ids: &[ItemId]) -> BulkDeleteReport {
        let mut report = BulkDeleteReport::default();

        for &id in ids {
            match self.store.delete(self.token, Table::Items, id.as_i64()).await {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    tracing::warn!(item_id = %id, error = %e, "Bulk delete: item failed");
                    report.failed.push(BulkDeleteFailure {
                        id,
                        error: bulk_failure_message(&e).to_owned(),
                    });
                }
            }
        }

        tracing::info!(
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Bulk delete finished"
        );
        report
    }

    async fn delete(&self, table: Table, id: i64) -> Result<(), SyncError> {
        self.store
            .delete(self.token, table, id)
            .await
            .map_err(|e| SyncError::from_backend(e, table))?;

        tracing::info!(table = table.name(), id, "Row deleted");
        let id = id.to_string();
        add_breadcrumb("pantry", "Deleted row", Some(&[("table", table.name()), ("id", &id)]));
        Ok(())
    }
}

fn bulk_failure_message(err: &BackendError) -> &'static str {
    match err {
        BackendError::NotFound => "item not found",
        BackendError::Timeout => "request timed out",
        BackendError::Unauthorized(_) => "not authorized",
        _ => "failed to delete item",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_violation_means_missing_parent() {
        let err = BackendError::Api {
            status: 409,
            message: "insert or update on table \"items\" violates foreign key constraint".to_string(),
        };
        assert!(matches!(
            SyncError::from_insert(err, Table::Categories),
            SyncError::NotFound("category")
        ));
    }

    #[test]
    fn test_conflict_outside_insert_is_not_a_missing_row() {
        let err = BackendError::Api {
            status: 409,
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert!(matches!(
            SyncError::from_backend(err, Table::Items),
            SyncError::Backend(BackendError::Api { status: 409, .. })
        ));
        assert!(matches!(
            SyncError::from_backend(BackendError::NotFound, Table::Items),
            SyncError::NotFound("item")
        ));
    }

    #[test]
    fn test_server_errors_stay_backend_errors() {
        let err = BackendError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(matches!(
            SyncError::from_backend(err, Table::Items),
            SyncError::Backend(BackendError::Api { status: 500, .. })
        ));
        assert!(matches!(
            SyncError::from_backend(BackendError::Timeout, Table::Items),
            SyncError::Backend(BackendError::Timeout)
        ));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            SyncError::NotFound(Table::StorageAreas.label()).to_string(),
            "storage area not found"
        );
    }

    #[test]
    fn test_bulk_failure_messages_hide_backend_text() {
        let err = BackendError::Api {
            status: 500,
            message: "relation \"items\" does not exist".to_string(),
        };
        assert_eq!(bulk_failure_message(&err), "failed to delete item");
        assert_eq!(bulk_failure_message(&BackendError::NotFound), "item not found");
    }
}
