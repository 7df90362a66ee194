//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are currency-agnostic: every amount in a cart, order or catalog is
//! in the store's single currency unit. A [`Price`] is never negative and
//! never above [`Price::MAX_UNITS`]; arithmetic on prices saturates instead of
//! overflowing.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::lenient;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount is above [`Price::MAX_UNITS`].
    #[error("price cannot exceed {max} (got {amount})")]
    TooLarge { amount: Decimal, max: i64 },
}

/// A non-negative monetary amount.
///
/// Serializes as a decimal string to preserve precision, and deserializes from
/// either a JSON number or a numeric string.
///
/// ```
/// use rust_decimal::Decimal;
/// use tote_core::Price;
///
/// let shirt = Price::new(Decimal::from(499)).unwrap();
/// assert_eq!(shirt.times(2).to_string(), "998.00");
/// assert!(Price::new(Decimal::from(-1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted unit price, in whole currency units.
    pub const MAX_UNITS: i64 = 1_000_000_000_000;

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX_UNITS`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > Decimal::from(Self::MAX_UNITS) {
            return Err(PriceError::TooLarge {
                amount,
                max: Self::MAX_UNITS,
            });
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// This price multiplied by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// This price scaled by a non-negative rate, rounded to cents
    /// (half away from zero).
    #[must_use]
    pub fn scaled(self, rate: Decimal) -> Self {
        let scaled = self
            .0
            .saturating_mul(rate.abs())
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self(scaled)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = lenient::decimal(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
