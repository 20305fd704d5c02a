//! Expiration dates as submitted from a date input.

use chrono::NaiveDate;

/// Error returned for a non-empty expiration that is not a `YYYY-MM-DD` date.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("expiration date must be YYYY-MM-DD, got {0:?}")]
pub struct InvalidExpiration(pub String);

/// Read an expiration field.
///
/// An empty (or whitespace-only) string means "no expiration" and yields
/// `Ok(None)`, not an error.
///
/// # Errors
///
/// Returns [`InvalidExpiration`] if the text is non-empty and not an ISO date.
pub fn parse_expiration(text: &str) -> Result<Option<NaiveDate>, InvalidExpiration> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    // Accept full timestamps from clients that send `2025-01-01T00:00:00`.
    let date_part = text.split_once('T').map_or(text, |(date, _)| date);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| InvalidExpiration(text.to_owned()))
}

/// Whole days from `today` until `date`. Negative once the date has passed.
#[must_use]
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(parse_expiration(""), Ok(None));
        assert_eq!(parse_expiration("   "), Ok(None));
    }

    #[test]
    fn test_iso_date_parses() {
        assert_eq!(parse_expiration("2025-01-01"), Ok(Some(date(2025, 1, 1))));
        assert_eq!(
            parse_expiration("2025-01-01T00:00:00Z"),
            Ok(Some(date(2025, 1, 1)))
        );
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_expiration("tomorrow").is_err());
        assert!(parse_expiration("2025-13-01").is_err());
    }

    #[test]
    fn test_days_until() {
        assert_eq!(days_until(date(2025, 1, 8), date(2025, 1, 1)), 7);
        assert_eq!(days_until(date(2024, 12, 31), date(2025, 1, 1)), -1);
    }
}
