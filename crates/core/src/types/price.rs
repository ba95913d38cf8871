//! Type-safe price representation using decimal arithmetic.
//!
//! WooCommerce transmits every monetary value as a decimal string
//! (`"21.99"`), and uses an empty string for products that have no price
//! set. [`Price`] keeps the decimal precision; the `option` serde helpers
//! map the empty string to `None`.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price '{0}'")]
    Invalid(String),
    /// The input is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(String),
}

/// A non-negative amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero in the store currency.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Parse a price from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(s.to_string()));
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price multiplied by a quantity (line total).
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, price| acc + price)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde helpers for optional prices encoded as possibly-empty strings.
///
/// Use with `#[serde(default, with = "crate::types::price::option")]`.
pub mod option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Price;

    /// Deserialize `""` or `null` as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-empty value is not a valid price.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Price>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Price::parse(s).map(Some).map_err(serde::de::Error::custom),
        }
    }

    /// Serialize `None` as an empty string, matching the wire format.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    #[allow(clippy::ref_option)] // signature required by `#[serde(with)]`
    pub fn serialize<S: Serializer>(price: &Option<Price>, serializer: S) -> Result<S::Ok, S::Error> {
        match price {
            Some(p) => p.serialize(serializer),
            None => "".serialize(serializer),
        }
    }
}
