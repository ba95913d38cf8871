//! Client-side cart projection.
//!
//! The cart is not a remote resource of its own. It is a pure projection of
//! the shopper's last known order: each line item becomes a
//! `(product id, quantity)` pair, and pairs are joined with previously
//! fetched products for display. No order means an empty cart.

use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::id::ProductId;
use super::order::Order;
use super::price::Price;

/// A `(product id, quantity)` pair projected from an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

impl From<(ProductId, u32)> for CartLine {
    fn from((product_id, quantity): (ProductId, u32)) -> Self {
        Self::new(product_id, quantity)
    }
}

/// Project an order's line items into cart lines, preserving their order.
#[must_use]
pub fn cart_lines(order: &Order) -> Vec<CartLine> {
    order
        .line_items
        .iter()
        .map(|line| CartLine::new(line.product_id, line.quantity))
        .collect()
}

/// A product paired with the quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Join cart lines with a catalog of fetched products.
    ///
    /// Lines keep their order. Lines whose product has not been fetched are
    /// skipped.
    #[must_use]
    pub fn pair(lines: &[CartLine], catalog: &[Product]) -> Vec<Self> {
        lines
            .iter()
            .filter_map(|line| {
                catalog
                    .iter()
                    .find(|product| product.id == line.product_id)
                    .map(|product| Self {
                        product: product.clone(),
                        quantity: line.quantity,
                    })
            })
            .collect()
    }

    /// Unit price times quantity; zero when the product has no price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product
            .price
            .map_or(Price::ZERO, |price| price.times(self.quantity))
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(items: &[Self]) -> Price {
        items.iter().map(Self::line_total).sum()
    }
}
