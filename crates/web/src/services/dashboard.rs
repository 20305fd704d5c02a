//! Read-only aggregates for the dashboard.

use pantry_core::activity::sort_newest_first;
use pantry_core::{ChartSlice, EntityTotals, LocationItemCount, RenderedActivity, stats};
use serde::Serialize;

use crate::backend::{BackendError, PantryStore, Table};

/// Activity rows returned when the client does not ask for a number.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 10;

/// Upper bound on activity rows per request.
pub const MAX_ACTIVITY_LIMIT: u32 = 50;

/// Clamp a requested activity limit into `1..=MAX_ACTIVITY_LIMIT`.
#[must_use]
pub fn clamp_activity_limit(requested: Option<i64>) -> u32 {
    requested.map_or(DEFAULT_ACTIVITY_LIMIT, |n| {
        u32::try_from(n.clamp(1, i64::from(MAX_ACTIVITY_LIMIT))).unwrap_or(DEFAULT_ACTIVITY_LIMIT)
    })
}

/// Item counts per location, with the chart built from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemsPerLocation {
    pub rows: Vec<LocationItemCount>,
    pub chart: Vec<ChartSlice>,
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub totals: EntityTotals,
    pub recent_activity: Vec<RenderedActivity>,
    pub items_per_location: ItemsPerLocation,
}

pub struct DashboardService<'a> {
    store: &'a dyn PantryStore,
    token: &'a str,
}

impl<'a> DashboardService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn PantryStore, token: &'a str) -> Self {
        Self { store, token }
    }

    /// Row counts for all four levels, fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first backend error.
    pub async fn counts(&self) -> Result<EntityTotals, BackendError> {
        let [locations, areas, categories, items] = Table::ALL;
        let (locations, storage_areas, categories, items) = tokio::try_join!(
            self.store.count(self.token, locations),
            self.store.count(self.token, areas),
            self.store.count(self.token, categories),
            self.store.count(self.token, items),
        )?;

        Ok(EntityTotals {
            locations,
            storage_areas,
            categories,
            items,
        })
    }

    /// The newest activity rows, rendered for display.
    ///
    /// # Errors
    ///
    /// Returns error if the backend call fails.
    pub async fn recent_activity(&self, limit: u32) -> Result<Vec<RenderedActivity>, BackendError> {
        let mut entries = self.store.recent_activity(self.token, limit).await?;
        sort_newest_first(&mut entries);
        Ok(entries.iter().map(RenderedActivity::from).collect())
    }

    /// # Errors
    ///
    /// Returns error if the backend call fails.
    pub async fn items_per_location(&self) -> Result<ItemsPerLocation, BackendError> {
        let rows = self.store.items_per_location(self.token).await?;
        let chart = stats::chart_slices(&rows);
        Ok(ItemsPerLocation { rows, chart })
    }

    /// The whole dashboard payload.
    ///
    /// # Errors
    ///
    /// Returns the first backend error.
    pub async fn load(&self) -> Result<Dashboard, BackendError> {
        let (totals, recent_activity, items_per_location) = tokio::try_join!(
            self.counts(),
            self.recent_activity(DEFAULT_ACTIVITY_LIMIT),
            self.items_per_location(),
        )?;

        Ok(Dashboard {
            totals,
            recent_activity,
            items_per_location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_limit_defaults_and_clamps() {
        assert_eq!(clamp_activity_limit(None), 10);
        assert_eq!(clamp_activity_limit(Some(0)), 1);
        assert_eq!(clamp_activity_limit(Some(-5)), 1);
        assert_eq!(clamp_activity_limit(Some(25)), 25);
        assert_eq!(clamp_activity_limit(Some(500)), 50);
    }
}
