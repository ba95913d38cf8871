//! Data sources: one async method per store query.
//!
//! [`DataSource`] is the seam between the repository and the network.
//! [`RemoteDataSource`] talks to the store through [`WooClient`];
//! [`stub::StubDataSource`] serves canned records in tests.
//!
//! Implementations propagate transport errors unchanged. They never retry
//! and never cache.
//!
//! [`WooClient`]: crate::woo::WooClient

mod remote;
#[cfg(any(test, feature = "test-util"))]
pub mod stub;

pub use remote::RemoteDataSource;

use async_trait::async_trait;
use woostore_core::{
    Category, CategoryId, Coupon, Customer, CustomerId, CustomerPatch, Email, NewCustomer,
    NewOrder, NewReview, Order, OrderId, Product, ProductId, Review,
};

use crate::woo::WooError;

/// Ranked product listings shown on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductFacet {
    /// Newest first.
    Latest,
    /// Most sold first.
    Best,
    /// Highest rated first.
    Favourite,
}

impl ProductFacet {
    /// The `orderby` key the store ranks this facet by.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Latest => "date",
            Self::Best => "popularity",
            Self::Favourite => "rating",
        }
    }
}

impl std::str::FromStr for ProductFacet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "best" => Ok(Self::Best),
            "favourite" | "favorite" => Ok(Self::Favourite),
            _ => Err(format!("expected latest, best or favourite, got '{s}'")),
        }
    }
}

/// Store queries and mutations.
///
/// Paging is 1-based. Price bounds are decimal strings where an empty
/// string means unbounded; a `None` category means no category filter.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn latest_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError>;

    async fn favourite_products(&self, page: u32, per_page: u32)
    -> Result<Vec<Product>, WooError>;

    async fn best_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError>;

    async fn categories(&self, page: u32, per_page: u32) -> Result<Vec<Category>, WooError>;

    async fn products_in_category(
        &self,
        page: u32,
        per_page: u32,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, WooError>;

    async fn search(&self, per_page: u32, query: &str) -> Result<Vec<Product>, WooError>;

    /// Search ranked by `sort`, forwarded to the store as `orderby`.
    async fn sort(&self, per_page: u32, query: &str, sort: &str)
    -> Result<Vec<Product>, WooError>;

    /// Search ranked by `sort` and restricted to a price band and category.
    ///
    /// `higher_price` is the upper bound, `lower_price` the lower one.
    async fn sort_and_filter(
        &self,
        per_page: u32,
        query: &str,
        sort: &str,
        higher_price: &str,
        lower_price: &str,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Product>, WooError>;

    async fn product(&self, id: ProductId) -> Result<Product, WooError>;

    /// The product featured in the special offers slider.
    async fn special_offers(&self) -> Result<Product, WooError>;

    async fn customer_by_email(&self, email: &Email) -> Result<Customer, WooError>;

    async fn customer(&self, id: CustomerId) -> Result<Customer, WooError>;

    async fn create_customer(&self, body: &NewCustomer) -> Result<Customer, WooError>;

    async fn update_customer(
        &self,
        id: CustomerId,
        body: &CustomerPatch,
    ) -> Result<Customer, WooError>;

    async fn order(&self, id: OrderId) -> Result<Order, WooError>;

    async fn create_order(&self, body: &NewOrder) -> Result<Order, WooError>;

    async fn update_order(&self, id: OrderId, body: &NewOrder) -> Result<Order, WooError>;

    async fn reviews(
        &self,
        product_id: ProductId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Review>, WooError>;

    async fn create_review(&self, body: &NewReview) -> Result<Review, WooError>;

    async fn coupon_by_code(&self, code: &str) -> Result<Coupon, WooError>;
}
