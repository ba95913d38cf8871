//! Repository: every data source call as a stream of [`LoadState`]s.
//!
//! # Stream shapes
//!
//! - **Queries** yield `Loading`, then exactly one `Success` or `Error`,
//!   then end.
//! - **Mutations** (creating or updating customers, orders and reviews)
//!   yield exactly one `Success` or `Error`.
//!
//! Streams are lazy: the data source is called when the stream is first
//! polled, once per stream. Calling an operation again builds a fresh
//! stream and a fresh request. Errors are passed through unclassified.
//!
//! The repository holds no state beyond a shared handle to its source.

mod load_state;

pub use load_state::LoadState;

use std::future::Future;
use std::sync::Arc;

use async_stream::stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::warn;
use woostore_core::{
    CartLine, Category, CategoryId, Coupon, Customer, CustomerId, CustomerPatch, Email,
    NewCustomer, NewOrder, NewReview, Order, OrderId, Product, ProductId, Review, cart_lines,
};

use crate::source::{DataSource, ProductFacet};
use crate::woo::WooError;

/// Stream of states for one request.
pub type ResultStream<T> = BoxStream<'static, LoadState<T>>;

/// Wraps a [`DataSource`] and turns each call into a [`ResultStream`].
///
/// Cloning is cheap; clones share the source.
pub struct Repository<D: ?Sized = dyn DataSource> {
    source: Arc<D>,
}

impl<D: ?Sized> Clone for Repository<D> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<D: ?Sized> std::fmt::Debug for Repository<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    /// Repository over a type-erased source, as used by the screens.
    pub fn shared<S: DataSource + 'static>(source: Arc<S>) -> Self {
        Self { source }
    }
}

impl<D: DataSource + ?Sized + 'static> Repository<D> {
    pub const fn new(source: Arc<D>) -> Self {
        Self { source }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    #[must_use]
    pub fn latest_products(&self, page: u32, per_page: u32) -> ResultStream<Vec<Product>> {
        let source = Arc::clone(&self.source);
        query("latest_products", move || async move {
            source.latest_products(page, per_page).await
        })
    }

    #[must_use]
    pub fn favourite_products(&self, page: u32, per_page: u32) -> ResultStream<Vec<Product>> {
        let source = Arc::clone(&self.source);
        query("favourite_products", move || async move {
            source.favourite_products(page, per_page).await
        })
    }

    #[must_use]
    pub fn best_products(&self, page: u32, per_page: u32) -> ResultStream<Vec<Product>> {
        let source = Arc::clone(&self.source);
        query("best_products", move || async move {
            source.best_products(page, per_page).await
        })
    }

    /// The listing for `facet`.
    #[must_use]
    pub fn products(
        &self,
        facet: ProductFacet,
        page: u32,
        per_page: u32,
    ) -> ResultStream<Vec<Product>> {
        match facet {
            ProductFacet::Latest => self.latest_products(page, per_page),
            ProductFacet::Best => self.best_products(page, per_page),
            ProductFacet::Favourite => self.favourite_products(page, per_page),
        }
    }

    #[must_use]
    pub fn categories(&self, page: u32, per_page: u32) -> ResultStream<Vec<Category>> {
        let source = Arc::clone(&self.source);
        query("categories", move || async move {
            source.categories(page, per_page).await
        })
    }

    #[must_use]
    pub fn products_in_category(
        &self,
        page: u32,
        per_page: u32,
        category_id: CategoryId,
    ) -> ResultStream<Vec<Product>> {
        let source = Arc::clone(&self.source);
        query("products_in_category", move || async move {
            source
                .products_in_category(page, per_page, category_id)
                .await
        })
    }

    #[must_use]
    pub fn search(&self, per_page: u32, search: &str) -> ResultStream<Vec<Product>> {
        let source = Arc::clone(&self.source);
        let search = search.to_string();
        query("search", move || async move {
            source.search(per_page, &search).await
        })
    }

    #[must_use]
    pub fn sort(&self, per_page: u32, search: &str, sort: &str) -> ResultStream<Vec<Product>> {
        let source = Arc::clone(&self.source);
        let (search, sort) = (search.to_string(), sort.to_string());
        query("sort", move || async move {
            source.sort(per_page, &search, &sort).await
        })
    }

    /// Search ranked by `sort` within `lower_price..=higher_price` and an
    /// optional category. All arguments reach the data source unchanged.
    #[must_use]
    pub fn sort_and_filter(
        &self,
        per_page: u32,
        search: &str,
        sort: &str,
        higher_price: &str,
        lower_price: &str,
        category_id: Option<CategoryId>,
    ) -> ResultStream<Vec<Product>> {
        let source = Arc::clone(&self.source);
        let (search, sort) = (search.to_string(), sort.to_string());
        let (higher_price, lower_price) = (higher_price.to_string(), lower_price.to_string());
        query("sort_and_filter", move || async move {
            source
                .sort_and_filter(
                    per_page,
                    &search,
                    &sort,
                    &higher_price,
                    &lower_price,
                    category_id,
                )
                .await
        })
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> ResultStream<Product> {
        let source = Arc::clone(&self.source);
        query("product", move || async move { source.product(id).await })
    }

    #[must_use]
    pub fn special_offers(&self) -> ResultStream<Product> {
        let source = Arc::clone(&self.source);
        query("special_offers", move || async move {
            source.special_offers().await
        })
    }

    // =========================================================================
    // Customers
    // =========================================================================

    #[must_use]
    pub fn customer_by_email(&self, email: &Email) -> ResultStream<Customer> {
        let source = Arc::clone(&self.source);
        let email = email.clone();
        query("customer_by_email", move || async move {
            source.customer_by_email(&email).await
        })
    }

    #[must_use]
    pub fn customer(&self, id: CustomerId) -> ResultStream<Customer> {
        let source = Arc::clone(&self.source);
        query("customer", move || async move { source.customer(id).await })
    }

    #[must_use]
    pub fn create_customer(&self, body: NewCustomer) -> ResultStream<Customer> {
        let source = Arc::clone(&self.source);
        mutation("create_customer", move || async move {
            source.create_customer(&body).await
        })
    }

    #[must_use]
    pub fn update_customer(&self, id: CustomerId, body: CustomerPatch) -> ResultStream<Customer> {
        let source = Arc::clone(&self.source);
        mutation("update_customer", move || async move {
            source.update_customer(id, &body).await
        })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    #[must_use]
    pub fn order(&self, id: OrderId) -> ResultStream<Order> {
        let source = Arc::clone(&self.source);
        query("order", move || async move { source.order(id).await })
    }

    #[must_use]
    pub fn create_order(&self, body: NewOrder) -> ResultStream<Order> {
        let source = Arc::clone(&self.source);
        mutation("create_order", move || async move {
            source.create_order(&body).await
        })
    }

    #[must_use]
    pub fn update_order(&self, id: OrderId, body: NewOrder) -> ResultStream<Order> {
        let source = Arc::clone(&self.source);
        mutation("update_order", move || async move {
            source.update_order(id, &body).await
        })
    }

    /// Cart lines of an order, in line item order.
    ///
    /// Unlike every other operation this never fails: any error is logged
    /// and reported as an empty cart.
    pub async fn items_in_cart(&self, order_id: OrderId) -> Vec<CartLine> {
        match self.source.order(order_id).await {
            Ok(order) => cart_lines(&order),
            Err(error) => {
                warn!(%order_id, %error, "Cart order unavailable, showing an empty cart");
                Vec::new()
            }
        }
    }

    // =========================================================================
    // Reviews and coupons
    // =========================================================================

    #[must_use]
    pub fn reviews(
        &self,
        product_id: ProductId,
        page: u32,
        per_page: u32,
    ) -> ResultStream<Vec<Review>> {
        let source = Arc::clone(&self.source);
        query("reviews", move || async move {
            source.reviews(product_id, page, per_page).await
        })
    }

    #[must_use]
    pub fn create_review(&self, body: NewReview) -> ResultStream<Review> {
        let source = Arc::clone(&self.source);
        mutation("create_review", move || async move {
            source.create_review(&body).await
        })
    }

    #[must_use]
    pub fn coupon_by_code(&self, code: &str) -> ResultStream<Coupon> {
        let source = Arc::clone(&self.source);
        let code = code.to_string();
        query("coupon_by_code", move || async move {
            source.coupon_by_code(&code).await
        })
    }
}

/// `Loading`, then the outcome of `call`.
fn query<T, F, Fut>(operation: &'static str, call: F) -> ResultStream<T>
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, WooError>> + Send + 'static,
{
    stream! {
        yield LoadState::Loading;
        yield settle(operation, call().await);
    }
    .boxed()
}

/// Only the outcome of `call`.
fn mutation<T, F, Fut>(operation: &'static str, call: F) -> ResultStream<T>
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, WooError>> + Send + 'static,
{
    stream! {
        yield settle(operation, call().await);
    }
    .boxed()
}

fn settle<T>(operation: &'static str, result: Result<T, WooError>) -> LoadState<T> {
    if let Err(error) = &result {
        warn!(operation, %error, "Store request failed");
    }
    LoadState::from(result)
}
