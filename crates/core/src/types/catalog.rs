//! Catalog records: products and categories.
//!
//! Both are immutable snapshots of upstream state. The client never
//! mutates them locally; a refresh replaces the whole record.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ImageId, ProductId};
use super::price::Price;

// =============================================================================
// Product
// =============================================================================

/// A product as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub permalink: String,
    /// HTML description.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    /// Current price; `None` when the store has no price set.
    #[serde(default, with = "super::price::option")]
    pub price: Option<Price>,
    #[serde(default, with = "super::price::option")]
    pub regular_price: Option<Price>,
    #[serde(default, with = "super::price::option")]
    pub sale_price: Option<Price>,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub purchasable: bool,
    #[serde(default)]
    pub stock_status: StockStatus,
    /// Average rating as sent by the store (e.g. `"4.50"`).
    #[serde(default)]
    pub average_rating: String,
    #[serde(default)]
    pub rating_count: u32,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
}

impl Product {
    /// URL of the first image, if any.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(|image| image.src.as_str())
    }

    /// Whether the product belongs to the given category.
    #[must_use]
    pub fn in_category(&self, category: CategoryId) -> bool {
        self.categories.iter().any(|c| c.id == category)
    }
}

/// Product or category image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub id: Option<ImageId>,
    /// Image URL.
    pub src: String,
    #[serde(default)]
    pub name: String,
    /// Alt text for accessibility.
    #[serde(default)]
    pub alt: String,
}

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Product stock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
    /// Any status added by store extensions.
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// Parent category; `0` on the wire for top-level categories.
    #[serde(default)]
    pub parent: i64,
    #[serde(default)]
    pub description: String,
    /// Number of published products in the category.
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub image: Option<CategoryImage>,
}

impl Category {
    /// Whether this is a top-level category.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent == 0
    }
}

/// Image attached to a category.
pub type CategoryImage = ProductImage;
