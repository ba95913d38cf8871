//! [`DataSource`] over the WooCommerce REST API.

use async_trait::async_trait;
use tracing::instrument;
use woostore_core::{
    Category, CategoryId, Coupon, Customer, CustomerId, CustomerPatch, Email, NewCustomer,
    NewOrder, NewReview, Order, OrderId, Product, ProductId, Review,
};

use super::{DataSource, ProductFacet};
use crate::config::StoreConfig;
use crate::woo::{QueryParams, WooClient, WooError};

/// Data source backed by the store's REST API.
#[derive(Debug, Clone)]
pub struct RemoteDataSource {
    client: WooClient,
    special_offers: Option<ProductId>,
}

impl RemoteDataSource {
    #[must_use]
    pub const fn new(client: WooClient, special_offers: Option<ProductId>) -> Self {
        Self {
            client,
            special_offers,
        }
    }

    /// Build the client and data source from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &StoreConfig) -> Result<Self, WooError> {
        Ok(Self::new(
            WooClient::new(&config.woo)?,
            config.special_offers_product,
        ))
    }

    async fn ranked(
        &self,
        facet: ProductFacet,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooError> {
        let query = QueryParams::new()
            .page(page)
            .per_page(per_page)
            .order_by(facet.order_by())
            .order("desc");
        self.client.get("products", &query).await
    }
}

#[async_trait]
impl DataSource for RemoteDataSource {
    #[instrument(skip(self))]
    async fn latest_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError> {
        self.ranked(ProductFacet::Latest, page, per_page).await
    }

    #[instrument(skip(self))]
    async fn favourite_products(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooError> {
        self.ranked(ProductFacet::Favourite, page, per_page).await
    }

    #[instrument(skip(self))]
    async fn best_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError> {
        self.ranked(ProductFacet::Best, page, per_page).await
    }

    #[instrument(skip(self))]
    async fn categories(&self, page: u32, per_page: u32) -> Result<Vec<Category>, WooError> {
        let query = QueryParams::new().page(page).per_page(per_page);
        self.client.get("products/categories", &query).await
    }

    #[instrument(skip(self))]
    async fn products_in_category(
        &self,
        page: u32,
        per_page: u32,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, WooError> {
        let query = QueryParams::new()
            .page(page)
            .per_page(per_page)
            .category(Some(category_id));
        self.client.get("products", &query).await
    }

    #[instrument(skip(self))]
    async fn search(&self, per_page: u32, query: &str) -> Result<Vec<Product>, WooError> {
        let params = QueryParams::new().per_page(per_page).search(query);
        self.client.get("products", &params).await
    }

    #[instrument(skip(self))]
    async fn sort(
        &self,
        per_page: u32,
        query: &str,
        sort: &str,
    ) -> Result<Vec<Product>, WooError> {
        let params = QueryParams::new()
            .per_page(per_page)
            .search(query)
            .order_by(sort);
        self.client.get("products", &params).await
    }

    #[instrument(skip(self))]
    async fn sort_and_filter(
        &self,
        per_page: u32,
        query: &str,
        sort: &str,
        higher_price: &str,
        lower_price: &str,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Product>, WooError> {
        let params = QueryParams::new()
            .per_page(per_page)
            .search(query)
            .order_by(sort)
            .max_price(higher_price)
            .min_price(lower_price)
            .category(category_id);
        self.client.get("products", &params).await
    }

    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<Product, WooError> {
        self.client
            .get(&format!("products/{id}"), &QueryParams::new())
            .await
    }

    #[instrument(skip(self))]
    async fn special_offers(&self) -> Result<Product, WooError> {
        let id = self
            .special_offers
            .ok_or_else(|| WooError::NotFound("no special offers product configured".into()))?;
        self.product(id).await
    }

    #[instrument(skip(self, email))]
    async fn customer_by_email(&self, email: &Email) -> Result<Customer, WooError> {
        let query = QueryParams::new().with("email", email.as_str());
        self.client
            .get_first("customers", &query, "customer with that email")
            .await
    }

    #[instrument(skip(self))]
    async fn customer(&self, id: CustomerId) -> Result<Customer, WooError> {
        self.client
            .get(&format!("customers/{id}"), &QueryParams::new())
            .await
    }

    #[instrument(skip(self, body))]
    async fn create_customer(&self, body: &NewCustomer) -> Result<Customer, WooError> {
        self.client.post("customers", body).await
    }

    #[instrument(skip(self, body))]
    async fn update_customer(
        &self,
        id: CustomerId,
        body: &CustomerPatch,
    ) -> Result<Customer, WooError> {
        self.client.put(&format!("customers/{id}"), body).await
    }

    #[instrument(skip(self))]
    async fn order(&self, id: OrderId) -> Result<Order, WooError> {
        self.client
            .get(&format!("orders/{id}"), &QueryParams::new())
            .await
    }

    #[instrument(skip(self, body))]
    async fn create_order(&self, body: &NewOrder) -> Result<Order, WooError> {
        self.client.post("orders", body).await
    }

    #[instrument(skip(self, body))]
    async fn update_order(&self, id: OrderId, body: &NewOrder) -> Result<Order, WooError> {
        self.client.put(&format!("orders/{id}"), body).await
    }

    #[instrument(skip(self))]
    async fn reviews(
        &self,
        product_id: ProductId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Review>, WooError> {
        let query = QueryParams::new()
            .page(page)
            .per_page(per_page)
            .with("product", product_id.to_string());
        self.client.get("products/reviews", &query).await
    }

    #[instrument(skip(self, body))]
    async fn create_review(&self, body: &NewReview) -> Result<Review, WooError> {
        self.client.post("products/reviews", body).await
    }

    #[instrument(skip(self))]
    async fn coupon_by_code(&self, code: &str) -> Result<Coupon, WooError> {
        let query = QueryParams::new().with("code", code.trim());
        self.client
            .get_first("coupons", &query, "coupon with that code")
            .await
    }
}
