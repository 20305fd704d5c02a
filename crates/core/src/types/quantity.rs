//! Item quantities and the lenient normalization applied to form input.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A non-negative item count.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The zero quantity, used whenever input cannot be read as a number.
    pub const ZERO: Self = Self(0);

    /// Create a quantity from a count.
    #[must_use]
    pub const fn new(count: u32) -> Self {
        Self(count)
    }

    /// Returns the count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Normalize a signed integer: negatives clamp to zero, huge values saturate.
    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        Self(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
    }

    /// Normalize a float by truncating toward zero. Non-finite values become zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // float-to-int `as` saturates
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self::from_i64(value.trunc() as i64)
    }

    /// Normalize free text the way a number input field is read.
    ///
    /// Leading whitespace and an optional sign are skipped and the leading run
    /// of decimal digits is taken, so `"12 cans"` reads as 12. Anything without
    /// leading digits reads as zero, as do negative numbers.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        let text = text.trim_start();
        let (negative, rest) = match text.as_bytes().first() {
            Some(b'-') => (true, text.get(1..).unwrap_or("")),
            Some(b'+') => (false, text.get(1..).unwrap_or("")),
            _ => (false, text),
        };

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = rest.get(..digits_end).unwrap_or("");
        if digits.is_empty() || negative {
            return Self::ZERO;
        }

        digits.parse::<u32>().map_or(Self(u32::MAX), Self)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Quantity {
    fn from(count: u32) -> Self {
        Self(count)
    }
}

/// A quantity exactly as submitted by a client: a JSON number, a string from a
/// text field, or an explicit `null`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawQuantity {
    /// A whole JSON number.
    Integer(i64),
    /// A fractional JSON number.
    Float(f64),
    /// Text from a form field.
    Text(String),
    /// Explicit `null`, or any other JSON value.
    Other(serde_json::Value),
}

impl RawQuantity {
    /// Normalize to a [`Quantity`]. Input that is not numeric becomes zero.
    #[must_use]
    pub fn normalize(&self) -> Quantity {
        match self {
            Self::Integer(n) => Quantity::from_i64(*n),
            Self::Float(n) => Quantity::from_f64(*n),
            Self::Text(s) => Quantity::parse_lenient(s),
            Self::Other(_) => Quantity::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_reads_leading_digits() {
        assert_eq!(Quantity::parse_lenient("3"), Quantity::new(3));
        assert_eq!(Quantity::parse_lenient("  12 cans"), Quantity::new(12));
        assert_eq!(Quantity::parse_lenient("+4"), Quantity::new(4));
        assert_eq!(Quantity::parse_lenient("7.9"), Quantity::new(7));
    }

    #[test]
    fn test_parse_lenient_non_numeric_is_zero() {
        for input in ["", "   ", "abc", "-", "x12", "NaN"] {
            assert_eq!(Quantity::parse_lenient(input), Quantity::ZERO, "input {input:?}");
        }
    }

    #[test]
    fn test_negative_values_clamp_to_zero() {
        assert_eq!(Quantity::parse_lenient("-5"), Quantity::ZERO);
        assert_eq!(Quantity::from_i64(-1), Quantity::ZERO);
        assert_eq!(Quantity::from_f64(-2.5), Quantity::ZERO);
    }

    #[test]
    fn test_float_truncates() {
        assert_eq!(Quantity::from_f64(2.99), Quantity::new(2));
        assert_eq!(Quantity::from_f64(f64::NAN), Quantity::ZERO);
        assert_eq!(Quantity::from_f64(f64::INFINITY), Quantity::ZERO);
    }

    #[test]
    fn test_huge_values_saturate() {
        assert_eq!(Quantity::from_i64(i64::MAX), Quantity::new(u32::MAX));
        assert_eq!(
            Quantity::parse_lenient("99999999999999999999"),
            Quantity::new(u32::MAX)
        );
    }

    #[test]
    fn test_raw_quantity_from_json() {
        let cases = [
            ("5", 5),
            ("5.8", 5),
            ("\"6\"", 6),
            ("\"six\"", 0),
            ("null", 0),
            ("true", 0),
            ("-3", 0),
        ];
        for (json, expected) in cases {
            let raw: RawQuantity = serde_json::from_str(json).unwrap_or(RawQuantity::Text(String::new()));
            assert_eq!(raw.normalize(), Quantity::new(expected), "json {json}");
        }
    }
}
