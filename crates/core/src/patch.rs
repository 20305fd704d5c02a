//! Item creation and partial-update payloads.
//!
//! Clients send loosely typed form data (quantities as strings, blank dates,
//! either `expiration` or `expiration_date`). The `*Input` types accept that
//! shape and `normalize()` turns it into a typed payload with only the allowed
//! fields, each already cleaned up.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Item;
use crate::types::{EmptyName, EntityName, InvalidExpiration, Quantity, RawQuantity, parse_expiration};

/// Errors produced while normalizing item input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// A new item needs a name.
    #[error(transparent)]
    EmptyName(#[from] EmptyName),
    /// The expiration was neither blank nor an ISO date.
    #[error(transparent)]
    InvalidExpiration(#[from] InvalidExpiration),
    /// An update carried nothing that can be changed.
    #[error("no valid fields to update")]
    NoFields,
}

/// Deserialize a field that was present in the payload, even if `null`.
///
/// Paired with `#[serde(default)]`, a missing field stays `None` while an
/// explicit `null` becomes `Some(None)`-like input.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A new item as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItemInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "present")]
    pub quantity: Option<RawQuantity>,
    #[serde(default, alias = "expiration")]
    pub expiration_date: Option<String>,
}

/// A validated new item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewItem {
    pub name: EntityName,
    pub quantity: Quantity,
    pub expiration_date: Option<NaiveDate>,
}

impl NewItemInput {
    /// Validate and normalize.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::EmptyName`] for a blank name and
    /// [`PatchError::InvalidExpiration`] for an unreadable date.
    pub fn normalize(&self) -> Result<NewItem, PatchError> {
        let name = EntityName::parse(&self.name)?;
        let quantity = self
            .quantity
            .as_ref()
            .map_or(Quantity::ZERO, RawQuantity::normalize);
        let expiration_date = match self.expiration_date.as_deref() {
            Some(text) => parse_expiration(text)?,
            None => None,
        };

        Ok(NewItem {
            name,
            quantity,
            expiration_date,
        })
    }
}

/// A partial item update as submitted by a client.
///
/// Fields that are absent are left untouched. `expiration_date` may also be
/// sent as `expiration`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatchInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub quantity: Option<RawQuantity>,
    #[serde(default, alias = "expiration", deserialize_with = "present")]
    pub expiration_date: Option<Option<String>>,
}

/// A normalized partial item update.
///
/// Serializes to exactly the columns being changed. A cleared expiration
/// serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<EntityName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Option<NaiveDate>>,
}

impl ItemPatchInput {
    /// Normalize into an [`ItemPatch`].
    ///
    /// - a blank `name` is dropped rather than rejected
    /// - a `quantity` that is not numeric becomes 0
    /// - a blank or `null` expiration clears the date
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::NoFields`] when nothing would change and
    /// [`PatchError::InvalidExpiration`] for an unreadable date.
    pub fn normalize(&self) -> Result<ItemPatch, PatchError> {
        let name = self.name.as_deref().and_then(EntityName::parse_optional);
        let quantity = self.quantity.as_ref().map(RawQuantity::normalize);
        let expiration_date = match &self.expiration_date {
            Some(Some(text)) => Some(parse_expiration(text)?),
            Some(None) => Some(None),
            None => None,
        };

        let patch = ItemPatch {
            name,
            quantity,
            expiration_date,
        };
        if patch.is_empty() {
            return Err(PatchError::NoFields);
        }
        Ok(patch)
    }
}

impl ItemPatch {
    /// True when the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.expiration_date.is_none()
    }

    /// Apply the patch to a local copy of an item.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.as_str().to_owned();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(expiration_date) = self.expiration_date {
            item.expiration_date = expiration_date;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{CategoryId, ItemId};

    fn patch(json: &str) -> Result<ItemPatch, PatchError> {
        serde_json::from_str::<ItemPatchInput>(json).unwrap().normalize()
    }

    #[test]
    fn test_non_numeric_quantity_becomes_zero() {
        for json in [
            r#"{"quantity": "abc"}"#,
            r#"{"quantity": ""}"#,
            r#"{"quantity": null}"#,
            r#"{"quantity": -4}"#,
        ] {
            assert_eq!(patch(json).unwrap().quantity, Some(Quantity::ZERO), "{json}");
        }
    }

    #[test]
    fn test_empty_expiration_clears_date() {
        let p = patch(r#"{"expiration_date": ""}"#).unwrap();
        assert_eq!(p.expiration_date, Some(None));

        let p = patch(r#"{"expiration": null}"#).unwrap();
        assert_eq!(p.expiration_date, Some(None));

        let body = serde_json::to_value(&p).unwrap();
        assert_eq!(body, serde_json::json!({ "expiration_date": null }));
    }

    #[test]
    fn test_missing_fields_untouched() {
        let p = patch(r#"{"quantity": "2"}"#).unwrap();
        assert_eq!(p.quantity, Some(Quantity::new(2)));
        assert!(p.name.is_none());
        assert!(p.expiration_date.is_none());
        assert_eq!(serde_json::to_value(&p).unwrap(), serde_json::json!({ "quantity": 2 }));
    }

    #[test]
    fn test_blank_name_only_is_no_fields() {
        assert_eq!(patch(r#"{"name": "   "}"#), Err(PatchError::NoFields));
        assert_eq!(patch("{}"), Err(PatchError::NoFields));
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(matches!(
            patch(r#"{"expiration_date": "soon"}"#),
            Err(PatchError::InvalidExpiration(_))
        ));
    }

    #[test]
    fn test_new_item_defaults() {
        let input: NewItemInput = serde_json::from_str(r#"{"name": " Rice "}"#).unwrap();
        let item = input.normalize().unwrap();
        assert_eq!(item.name.as_str(), "Rice");
        assert_eq!(item.quantity, Quantity::ZERO);
        assert_eq!(item.expiration_date, None);
    }

    #[test]
    fn test_new_item_requires_name() {
        let input: NewItemInput = serde_json::from_str(r#"{"name": "", "quantity": 2}"#).unwrap();
        assert_eq!(input.normalize(), Err(PatchError::EmptyName(EmptyName)));
    }

    #[test]
    fn test_apply_to_item() {
        let mut item = Item {
            id: ItemId::new(1),
            name: "Beans".to_owned(),
            quantity: Quantity::new(1),
            expiration_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            category_id: CategoryId::new(2),
            created_at: None,
        };
        patch(r#"{"name": "Black beans", "quantity": "5", "expiration": ""}"#)
            .unwrap()
            .apply_to(&mut item);

        assert_eq!(item.name, "Black beans");
        assert_eq!(item.quantity, Quantity::new(5));
        assert_eq!(item.expiration_date, None);
    }
}
