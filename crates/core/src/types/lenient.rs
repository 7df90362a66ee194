//! Deserializers for numeric fields that the backend may send as text.
//!
//! The cart and catalog endpoints emit prices and quantities either as JSON
//! numbers (`499.5`, `2`) or as numeric-looking strings (`"499.50"`, `" 2 "`).
//! Both forms are normalized here, before any arithmetic happens.
//!
//! Use with `#[serde(deserialize_with = "...")]`:
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Row {
//!     #[serde(deserialize_with = "tote_core::types::lenient::decimal")]
//!     price: Decimal,
//!     #[serde(deserialize_with = "tote_core::types::lenient::quantity")]
//!     quantity: u32,
//! }
//!
//! let row: Row = serde_json::from_str(r#"{"price": "12.50", "quantity": "3"}"#).unwrap();
//! assert_eq!(row.price, Decimal::new(1250, 2));
//! assert_eq!(row.quantity, 3);
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserializer;
use serde::de::{self, Visitor};

/// Deserialize a decimal from a JSON number or a numeric string.
///
/// # Errors
///
/// Fails if the value is neither a number nor a string holding a decimal.
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalVisitor)
}

/// Deserialize a non-negative whole quantity from a JSON number or string.
///
/// `2`, `2.0`, `"2"` and `" 2 "` all decode to `2`.
///
/// # Errors
///
/// Fails on negative, fractional, or out-of-range values.
pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = decimal(deserializer)?;
    decimal_to_quantity(value).map_err(de::Error::custom)
}

fn decimal_to_quantity(value: Decimal) -> Result<u32, String> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("quantity cannot be negative (got {value})"));
    }
    if !value.fract().is_zero() {
        return Err(format!("quantity must be a whole number (got {value})"));
    }
    value
        .trunc()
        .to_string()
        .parse::<u32>()
        .map_err(|_| format!("quantity out of range (got {value})"))
}

struct DecimalVisitor;

impl Visitor<'_> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        if !v.is_finite() {
            return Err(E::custom(format!("non-finite number {v}")));
        }
        // Display gives the shortest representation that round-trips,
        // so 499.99 stays 499.99 instead of picking up binary noise.
        Decimal::from_str(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            return Err(E::custom("empty string is not a number"));
        }
        Decimal::from_str(trimmed).map_err(|e| E::custom(format!("invalid number {v:?}: {e}")))
    }
}
