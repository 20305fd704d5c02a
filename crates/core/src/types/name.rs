//! Display names for locations, storage areas, categories and items.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a name is blank after trimming.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("name cannot be empty")]
pub struct EmptyName;

/// A human-entered entity name, trimmed and guaranteed non-empty.
///
/// The trimmed text is exactly what gets sent to the backend, so the name a
/// user sees right after creating an entity matches what a later fetch returns.
///
/// ```
/// use pantry_core::EntityName;
///
/// assert_eq!(EntityName::parse("  Pantry ").unwrap().as_str(), "Pantry");
/// assert!(EntityName::parse(" \t ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct EntityName(String);

impl EntityName {
    /// Parse a name from user input.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyName`] if the input is empty or only whitespace.
    pub fn parse(s: &str) -> Result<Self, EmptyName> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse a name, treating blank input as absent.
    #[must_use]
    pub fn parse_optional(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the name and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntityName {
    type Error = EmptyName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityName> for String {
    fn from(name: EntityName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_inputs_rejected() {
        for input in ["", " ", "\n\t", "   \r\n "] {
            assert_eq!(EntityName::parse(input), Err(EmptyName), "input {input:?}");
            assert!(EntityName::parse_optional(input).is_none());
        }
    }

    #[test]
    fn test_inner_whitespace_kept() {
        let name = EntityName::parse("  Canned   Goods ").ok();
        assert_eq!(name.as_ref().map(EntityName::as_str), Some("Canned   Goods"));
    }
}
