//! Order records.
//!
//! The storefront keeps the shopper's cart as a pending order on the store:
//! creating the cart creates an order, changing quantities updates it, and
//! the cart shown on screen is projected from its line items.

use core::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::customer::{Billing, Shipping};
use super::id::{CustomerId, LineItemId, OrderId, ProductId};
use super::price::Price;

/// An order as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub currency: String,
    #[serde(default, with = "super::price::option")]
    pub total: Option<Price>,
    /// `0` on the wire for guest orders.
    #[serde(default)]
    pub customer_id: i64,
    #[serde(default)]
    pub billing: Billing,
    #[serde(default)]
    pub shipping: Shipping,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub coupon_lines: Vec<CouponLine>,
    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,
}

impl Order {
    /// The owning customer, if the order is not a guest order.
    #[must_use]
    pub fn customer(&self) -> Option<CustomerId> {
        (self.customer_id > 0).then(|| CustomerId::new(self.customer_id))
    }

    /// Total number of units across all line items, saturating at
    /// `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.line_items
            .iter()
            .fold(0, |count: u32, line| count.saturating_add(line.quantity))
    }
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    #[serde(default, with = "super::price::option")]
    pub total: Option<Price>,
}

/// A coupon applied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponLine {
    pub code: String,
}

/// Order status.
///
/// Statuses added by store extensions are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    CheckoutDraft,
    Other(String),
}

impl OrderStatus {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::CheckoutDraft => "checkout-draft",
            Self::Other(s) => s,
        }
    }

    /// Whether the order can still be edited as a cart.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::CheckoutDraft | Self::OnHold)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "on-hold" => Self::OnHold,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            "failed" => Self::Failed,
            "checkout-draft" => Self::CheckoutDraft,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

// =============================================================================
// Request bodies
// =============================================================================

/// Request body for creating or updating an order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Shipping>,
    #[serde(default)]
    pub line_items: Vec<NewLineItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coupon_lines: Vec<CouponLine>,
}

impl NewOrder {
    /// A pending order holding the given products.
    #[must_use]
    pub fn with_lines(lines: impl IntoIterator<Item = (ProductId, u32)>) -> Self {
        Self {
            status: Some(OrderStatus::Pending),
            line_items: lines
                .into_iter()
                .map(|(product_id, quantity)| NewLineItem::new(product_id, quantity))
                .collect(),
            ..Self::default()
        }
    }
}

/// A line in an order request body.
///
/// When updating, `id` targets an existing line; a quantity of `0` removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LineItemId>,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl NewLineItem {
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            id: None,
            product_id,
            quantity,
        }
    }
}
