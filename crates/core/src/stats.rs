//! Dashboard aggregates.

use serde::{Deserialize, Serialize};

use crate::types::LocationId;

/// Row counts for each level of the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTotals {
    pub locations: u64,
    pub storage_areas: u64,
    pub categories: u64,
    pub items: u64,
}

/// A row of the items-per-location view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationItemCount {
    #[serde(default)]
    pub location_id: Option<LocationId>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub item_count: u64,
}

/// One slice of the items-by-location chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: u64,
}

/// Chart slices for the items-per-location rows.
///
/// Locations without items never get a slice, even if the view reports them
/// with a zero count.
#[must_use]
pub fn chart_slices(rows: &[LocationItemCount]) -> Vec<ChartSlice> {
    rows.iter()
        .filter(|row| row.item_count > 0)
        .map(|row| ChartSlice {
            name: row
                .location_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_owned()),
            value: row.item_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: Option<&str>, count: u64) -> LocationItemCount {
        LocationItemCount {
            location_id: None,
            location_name: name.map(str::to_owned),
            item_count: count,
        }
    }

    #[test]
    fn test_zero_counts_are_absent() {
        let slices = chart_slices(&[row(Some("Home"), 4), row(Some("Cabin"), 0)]);
        assert_eq!(
            slices,
            [ChartSlice {
                name: "Home".to_owned(),
                value: 4
            }]
        );
    }

    #[test]
    fn test_missing_name_is_unknown() {
        let slices = chart_slices(&[row(None, 2)]);
        assert_eq!(slices[0].name, "Unknown");
    }
}
