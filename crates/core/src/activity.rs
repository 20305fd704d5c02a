//! The recent-activity feed.
//!
//! Rows come from the backend's change-log view. Each row is rendered into an
//! action, a breadcrumb (`Beans in Canned Goods · Pantry @ Home`) and a
//! one-line detail that reads as a diff for updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const EMPTY: &str = "—";

/// Which kind of entity a change touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "&'static str")]
pub enum EntityKind {
    Location,
    StorageArea,
    Category,
    #[default]
    Item,
}

impl From<Option<String>> for EntityKind {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("location") => Self::Location,
            Some("storage_area") => Self::StorageArea,
            Some("category") => Self::Category,
            _ => Self::Item,
        }
    }
}

impl From<EntityKind> for &'static str {
    fn from(kind: EntityKind) -> Self {
        kind.as_str()
    }
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::StorageArea => "storage_area",
            Self::Category => "category",
            Self::Item => "item",
        }
    }
}

/// What happened to the entity. Unknown actions read as updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "&'static str")]
pub enum ActivityAction {
    Added,
    #[default]
    Updated,
    Deleted,
}

impl From<Option<String>> for ActivityAction {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("added") => Self::Added,
            Some("deleted") => Self::Deleted,
            _ => Self::Updated,
        }
    }
}

impl From<ActivityAction> for &'static str {
    fn from(action: ActivityAction) -> Self {
        match action {
            ActivityAction::Added => "added",
            ActivityAction::Updated => "updated",
            ActivityAction::Deleted => "deleted",
        }
    }
}

/// A row of the recent-activity view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub entity_type: EntityKind,
    #[serde(default)]
    pub action: ActivityAction,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub storage_area_name: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub item_or_entity_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub changes: Option<Value>,
}

fn or_empty(value: Option<&String>) -> &str {
    value.map_or(EMPTY, String::as_str)
}

impl ActivityEntry {
    /// Where the change happened, from the entity up to its location.
    #[must_use]
    pub fn breadcrumb(&self) -> String {
        let location = or_empty(self.location_name.as_ref());
        let area = or_empty(self.storage_area_name.as_ref());
        let category = or_empty(self.category_name.as_ref());
        match self.entity_type {
            EntityKind::Location => location.to_owned(),
            EntityKind::StorageArea => format!("{area} @ {location}"),
            EntityKind::Category => format!("{category} · {area} @ {location}"),
            EntityKind::Item => {
                let item = or_empty(self.item_name.as_ref());
                format!("{item} in {category} · {area} @ {location}")
            }
        }
    }

    fn subject(&self) -> &str {
        or_empty(self.item_or_entity_name.as_ref())
    }

    /// One-line description of the change.
    #[must_use]
    pub fn detail(&self) -> String {
        if self.entity_type != EntityKind::Item {
            return match self.action {
                ActivityAction::Deleted => format!("Removed {}", self.subject()),
                ActivityAction::Added => format!("Created {}", self.subject()),
                ActivityAction::Updated => self
                    .changes
                    .as_ref()
                    .and_then(|c| c.get("name"))
                    .filter(|diff| diff.is_object())
                    .map_or_else(
                        || "Updated".to_owned(),
                        |diff| {
                            format!(
                                "Name: {} to {}",
                                render_value(diff.get("from")),
                                render_value(diff.get("to"))
                            )
                        },
                    ),
            };
        }

        match self.action {
            ActivityAction::Added => {
                let mut line = format!("Qty {}", self.quantity.unwrap_or(0));
                if let Some(date) = self.expiration_date.as_deref().filter(|d| !d.is_empty()) {
                    line.push_str(" · Exp ");
                    line.push_str(date);
                }
                line
            }
            ActivityAction::Deleted => match self.category_name.as_deref() {
                Some(category) => format!("Removed {} from {category}", self.subject()),
                None => format!("Removed {}", self.subject()),
            },
            ActivityAction::Updated => format_changes(self.changes.as_ref()),
        }
    }
}

/// Display label for a changed column.
fn label(key: &str) -> String {
    match key {
        "expiration_date" => "Expiration".to_owned(),
        "quantity" => "Qty".to_owned(),
        "name" => "Name".to_owned(),
        other => other
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => EMPTY.to_owned(),
        Some(Value::String(s)) if s.is_empty() => EMPTY.to_owned(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(map)) => render_pairs(map),
        Some(other) => other.to_string(),
    }
}

/// Columns in display order: the familiar ones first, then the rest by name.
fn ordered(map: &Map<String, Value>) -> Vec<(&String, &Value)> {
    let rank = |key: &str| match key {
        "name" => 0,
        "quantity" => 1,
        "expiration_date" => 2,
        _ => 3,
    };
    let mut fields: Vec<_> = map.iter().collect();
    fields.sort_by(|(a, _), (b, _)| rank(a).cmp(&rank(b)).then_with(|| a.cmp(b)));
    fields
}

fn render_pairs(map: &Map<String, Value>) -> String {
    ordered(map)
        .into_iter()
        .map(|(key, value)| format!("{}: {}", label(key), render_value(Some(value))))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the `changes` column of an update.
///
/// The canonical shape is `{ column: { from, to } }`, rendered as
/// `Qty: 1 to 3 • Expiration: — to 2025-01-01`. Anything else is treated as
/// a snapshot of the new values.
#[must_use]
pub fn format_changes(changes: Option<&Value>) -> String {
    let Some(Value::Object(map)) = changes else {
        return "Updated".to_owned();
    };
    if map.is_empty() {
        return "Updated".to_owned();
    }

    let canonical = map.values().all(|diff| {
        diff.as_object()
            .is_some_and(|d| d.contains_key("from") || d.contains_key("to"))
    });

    if canonical {
        return ordered(map)
            .into_iter()
            .map(|(field, diff)| {
                format!(
                    "{}: {} to {}",
                    label(field),
                    render_value(diff.get("from")),
                    render_value(diff.get("to"))
                )
            })
            .collect::<Vec<_>>()
            .join(" • ");
    }

    let snapshot = ordered(map)
        .into_iter()
        .map(|(key, value)| format!("{}: {}", label(key), render_value(Some(value))))
        .collect::<Vec<_>>()
        .join(" • ");
    format!("Updated {snapshot}")
}

/// Order rows newest first. Rows with equal timestamps keep their order.
pub fn sort_newest_first(entries: &mut [ActivityEntry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// An activity row ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedActivity {
    pub id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub entity_type: EntityKind,
    pub action: ActivityAction,
    pub breadcrumb: String,
    pub detail: String,
}

impl From<&ActivityEntry> for RenderedActivity {
    fn from(entry: &ActivityEntry) -> Self {
        Self {
            id: entry.id,
            created_at: entry.created_at,
            entity_type: entry.entity_type,
            action: entry.action,
            breadcrumb: entry.breadcrumb(),
            detail: entry.detail(),
        }
    }
}
