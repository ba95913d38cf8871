//! Coupons. Looked up by code and read-only from the storefront.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::id::CouponId;
use super::price::Price;

/// A discount coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    /// Discount amount; a percentage for [`DiscountType::Percent`].
    #[serde(default, with = "super::price::option")]
    pub amount: Option<Price>,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date_expires: Option<NaiveDateTime>,
    #[serde(default, with = "super::price::option")]
    pub minimum_amount: Option<Price>,
    #[serde(default, with = "super::price::option")]
    pub maximum_amount: Option<Price>,
    #[serde(default)]
    pub free_shipping: bool,
}

impl Coupon {
    /// Whether the coupon has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.date_expires.is_some_and(|expires| expires <= now)
    }

    /// Whether a cart subtotal satisfies the coupon's spend limits.
    #[must_use]
    pub fn applies_to(&self, subtotal: Price) -> bool {
        self.minimum_amount.is_none_or(|min| subtotal >= min)
            && self.maximum_amount.is_none_or(|max| subtotal <= max)
    }
}

/// How a coupon's amount is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DiscountType {
    Percent,
    #[default]
    FixedCart,
    FixedProduct,
    Other(String),
}

impl DiscountType {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Percent => "percent",
            Self::FixedCart => "fixed_cart",
            Self::FixedProduct => "fixed_product",
            Self::Other(s) => s,
        }
    }
}

impl Serialize for DiscountType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DiscountType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match String::deserialize(deserializer)?.as_str() {
            "percent" => Self::Percent,
            "fixed_cart" => Self::FixedCart,
            "fixed_product" => Self::FixedProduct,
            other => Self::Other(other.to_string()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn coupon() -> Coupon {
        serde_json::from_str(
            r#"{"id": 719, "code": "10off", "amount": "10.00",
                "discount_type": "percent", "description": "",
                "date_expires": "2030-01-01T00:00:00",
                "minimum_amount": "100.00", "maximum_amount": "0.00",
                "free_shipping": false}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_coupon_from_wire() {
        let coupon = coupon();
        assert_eq!(coupon.code, "10off");
        assert_eq!(coupon.discount_type, DiscountType::Percent);
        assert_eq!(coupon.amount, Some(Price::parse("10").unwrap()));
    }

    #[test]
    fn test_expiry() {
        let coupon = coupon();
        let before = "2029-12-31T23:59:59".parse().unwrap();
        let after = "2030-01-02T00:00:00".parse().unwrap();
        assert!(!coupon.is_expired(before));
        assert!(coupon.is_expired(after));
    }

    #[test]
    fn test_spend_limits() {
        let mut coupon = coupon();
        coupon.maximum_amount = None;
        assert!(!coupon.applies_to(Price::parse("99.99").unwrap()));
        assert!(coupon.applies_to(Price::parse("100").unwrap()));
    }
}
