//! Type-safe price representation using decimal arithmetic.
//!
//! The POS API exchanges money as plain JSON numbers in a single store
//! currency. [`Price`] keeps the amount as a [`Decimal`] so that cart totals
//! never accumulate floating point error, and converts to and from JSON
//! numbers at the serde boundary.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// An amount of money in the store currency.
///
/// Serializes as a JSON number (e.g. `10.5`) and accepts both numbers and
/// numeric strings when deserializing.
///
/// ## Examples
///
/// ```
/// use poscore_core::Price;
///
/// let unit: Price = "10".parse().unwrap();
/// assert_eq!(unit.times(3).to_string(), "$30.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole amount of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Multiply a unit price by a quantity (line subtotal).
    ///
    /// Saturates at the bounds of [`Decimal`]; use [`Price::checked_times`]
    /// where an out-of-range amount must be rejected.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Line subtotal, or `None` if it does not fit in a [`Decimal`].
    #[must_use]
    pub fn checked_times(&self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Sum of two amounts, or `None` if it does not fit in a [`Decimal`].
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0.round_dp(2))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('$');
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }
        Decimal::from_str(trimmed)
            .map(Self)
            .map_err(|_| PriceError::Invalid(s.to_owned()))
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at the bounds of [`Decimal`].
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let amount = self
            .0
            .to_f64()
            .ok_or_else(|| S::Error::custom(format!("price {} is not representable as f64", self.0)))?;
        serializer.serialize_f64(amount)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_sum() {
        let unit = Price::from_units(10);
        let lines = [unit.times(3), Price::from_units(5).times(2)];
        assert_eq!(lines.iter().sum::<Price>(), Price::from_units(40));
    }

    #[test]
    fn test_is_positive() {
        assert!(Price::from_units(1).is_positive());
        assert!(!Price::ZERO.is_positive());
        assert!(!Price::from_units(-3).is_positive());
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_units(30).to_string(), "$30.00");
        assert_eq!("12.345".parse::<Price>().unwrap().to_string(), "$12.34");
    }

    #[test]
    fn test_parse() {
        assert_eq!("$4.50".parse::<Price>().unwrap(), Price::new(Decimal::new(450, 2)));
        assert_eq!("".parse::<Price>(), Err(PriceError::Empty));
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_json_numbers() {
        let price: Price = serde_json::from_str("10.5").unwrap();
        assert_eq!(price, Price::new(Decimal::new(105, 1)));
        assert_eq!(serde_json::to_string(&price).unwrap(), "10.5");

        let from_int: Price = serde_json::from_str("7").unwrap();
        assert_eq!(from_int, Price::from_units(7));

        let from_str: Price = serde_json::from_str("\"3.25\"").unwrap();
        assert_eq!(from_str, Price::new(Decimal::new(325, 2)));
    }

    #[test]
    fn test_overflow_is_checked_or_saturated() {
        let huge = Price::new(Decimal::MAX);

        assert_eq!(huge.checked_times(2), None);
        assert_eq!(huge.checked_add(Price::from_units(1)), None);
        assert_eq!(Price::from_units(3).checked_times(4), Some(Price::from_units(12)));

        assert_eq!(huge.times(2), huge);
        assert_eq!(huge + Price::from_units(1), huge);
    }
}
