//! In-memory [`DataSource`] for tests.
//!
//! Seed it with records, optionally make methods fail or respond slowly,
//! then inspect [`StubDataSource::calls`] to assert what the code under
//! test asked for.
//!
//! ```rust,ignore
//! let stub = StubDataSource::new()
//!     .with_products(vec![shoe, sock])
//!     .failing("best_products", 500, "boom");
//! let repository = Repository::new(Arc::new(stub));
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use woostore_core::{
    Category, CategoryId, Coupon, Customer, CustomerId, CustomerPatch, Email, LineItem,
    LineItemId, NewCustomer, NewOrder, NewReview, Order, OrderId, Product, ProductId, Review,
    ReviewId,
};

use super::DataSource;
use crate::woo::WooError;

/// Render call arguments for the call log.
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($arg.to_string()),*]
    };
}

/// A recorded data source call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Trait method name, e.g. `"sort_and_filter"`.
    pub method: &'static str,
    /// Arguments in declaration order, rendered as strings.
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
struct StubState {
    products: Vec<Product>,
    categories: Vec<Category>,
    customers: Vec<Customer>,
    orders: Vec<Order>,
    reviews: Vec<Review>,
    coupons: Vec<Coupon>,
    next_id: i64,
}

impl StubState {
    const fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Canned data source. Listing methods page through the seeded records;
/// create and update methods mutate them.
#[derive(Debug, Default)]
pub struct StubDataSource {
    state: Mutex<StubState>,
    failures: HashMap<&'static str, (u16, String)>,
    special_offers: Option<ProductId>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl StubDataSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StubState {
                next_id: 1000,
                ..StubState::default()
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        lock(&self.state).products = products;
        self
    }

    #[must_use]
    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        lock(&self.state).categories = categories;
        self
    }

    #[must_use]
    pub fn with_customers(self, customers: Vec<Customer>) -> Self {
        lock(&self.state).customers = customers;
        self
    }

    #[must_use]
    pub fn with_orders(self, orders: Vec<Order>) -> Self {
        lock(&self.state).orders = orders;
        self
    }

    #[must_use]
    pub fn with_reviews(self, reviews: Vec<Review>) -> Self {
        lock(&self.state).reviews = reviews;
        self
    }

    #[must_use]
    pub fn with_coupons(self, coupons: Vec<Coupon>) -> Self {
        lock(&self.state).coupons = coupons;
        self
    }

    /// Product returned by `special_offers`; unset means `NotFound`.
    #[must_use]
    pub const fn with_special_offers(mut self, id: ProductId) -> Self {
        self.special_offers = Some(id);
        self
    }

    /// Make every call to `method` fail as if the store answered `status`.
    #[must_use]
    pub fn failing(mut self, method: &'static str, status: u16, message: &str) -> Self {
        self.failures.insert(method, (status, message.to_string()));
        self
    }

    /// Delay every response. Calls are recorded before the delay.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Argument lists of every call to `method`.
    #[must_use]
    pub fn calls_to(&self, method: &str) -> Vec<Vec<String>> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method == method)
            .map(|call| call.args.clone())
            .collect()
    }

    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    async fn respond<T, F>(
        &self,
        method: &'static str,
        args: Vec<String>,
        f: F,
    ) -> Result<T, WooError>
    where
        F: FnOnce(&mut StubState) -> Result<T, WooError> + Send,
    {
        lock(&self.calls).push(Call { method, args });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((status, message)) = self.failures.get(method) {
            return Err(failure(*status, message));
        }

        f(&mut lock(&self.state))
    }

    async fn listing(
        &self,
        method: &'static str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooError> {
        self.respond(method, args![page, per_page], |state| {
            Ok(page_of(&state.products, page, per_page))
        })
        .await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn failure(status: u16, message: &str) -> WooError {
    match status {
        404 => WooError::NotFound(message.to_string()),
        429 => WooError::RateLimited(1),
        _ => WooError::Api {
            status,
            code: "stub_error".to_string(),
            message: message.to_string(),
        },
    }
}

fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    let per_page = per_page as usize;
    let skip = (page.max(1) as usize - 1) * per_page;
    items.iter().skip(skip).take(per_page).cloned().collect()
}

fn matches(product: &Product, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || product.name.to_lowercase().contains(&query)
}

fn not_found(what: &str) -> WooError {
    WooError::NotFound(what.to_string())
}

fn option_arg<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

#[async_trait]
impl DataSource for StubDataSource {
    async fn latest_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError> {
        self.listing("latest_products", page, per_page).await
    }

    async fn favourite_products(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooError> {
        self.listing("favourite_products", page, per_page).await
    }

    async fn best_products(&self, page: u32, per_page: u32) -> Result<Vec<Product>, WooError> {
        self.listing("best_products", page, per_page).await
    }

    async fn categories(&self, page: u32, per_page: u32) -> Result<Vec<Category>, WooError> {
        self.respond("categories", args![page, per_page], |state| {
            Ok(page_of(&state.categories, page, per_page))
        })
        .await
    }

    async fn products_in_category(
        &self,
        page: u32,
        per_page: u32,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, WooError> {
        self.respond(
            "products_in_category",
            args![page, per_page, category_id],
            |state| {
                let in_category: Vec<_> = state
                    .products
                    .iter()
                    .filter(|p| p.in_category(category_id))
                    .cloned()
                    .collect();
                Ok(page_of(&in_category, page, per_page))
            },
        )
        .await
    }

    async fn search(&self, per_page: u32, query: &str) -> Result<Vec<Product>, WooError> {
        self.respond("search", args![per_page, query], |state| {
            let found: Vec<_> = state
                .products
                .iter()
                .filter(|p| matches(p, query))
                .cloned()
                .collect();
            Ok(page_of(&found, 1, per_page))
        })
        .await
    }

    async fn sort(
        &self,
        per_page: u32,
        query: &str,
        sort: &str,
    ) -> Result<Vec<Product>, WooError> {
        self.respond("sort", args![per_page, query, sort], |state| {
            let found: Vec<_> = state
                .products
                .iter()
                .filter(|p| matches(p, query))
                .cloned()
                .collect();
            Ok(page_of(&found, 1, per_page))
        })
        .await
    }

    async fn sort_and_filter(
        &self,
        per_page: u32,
        query: &str,
        sort: &str,
        higher_price: &str,
        lower_price: &str,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Product>, WooError> {
        self.respond(
            "sort_and_filter",
            args![
                per_page,
                query,
                sort,
                higher_price,
                lower_price,
                option_arg(category_id)
            ],
            |state| {
                let found: Vec<_> = state
                    .products
                    .iter()
                    .filter(|p| matches(p, query))
                    .filter(|p| category_id.is_none_or(|id| p.in_category(id)))
                    .cloned()
                    .collect();
                Ok(page_of(&found, 1, per_page))
            },
        )
        .await
    }

    async fn product(&self, id: ProductId) -> Result<Product, WooError> {
        self.respond("product", args![id], |state| {
            state
                .products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| not_found("product"))
        })
        .await
    }

    async fn special_offers(&self) -> Result<Product, WooError> {
        let special = self.special_offers;
        self.respond("special_offers", Vec::new(), |state| {
            let id = special.ok_or_else(|| not_found("no special offers product configured"))?;
            state
                .products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| not_found("product"))
        })
        .await
    }

    async fn customer_by_email(&self, email: &Email) -> Result<Customer, WooError> {
        self.respond("customer_by_email", args![email.as_str()], |state| {
            state
                .customers
                .iter()
                .find(|c| c.email.eq_ignore_ascii_case(email.as_str()))
                .cloned()
                .ok_or_else(|| not_found("customer with that email"))
        })
        .await
    }

    async fn customer(&self, id: CustomerId) -> Result<Customer, WooError> {
        self.respond("customer", args![id], |state| {
            state
                .customers
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| not_found("customer"))
        })
        .await
    }

    async fn create_customer(&self, body: &NewCustomer) -> Result<Customer, WooError> {
        self.respond("create_customer", args![body.email], |state| {
            let customer = Customer {
                id: CustomerId::new(state.next_id()),
                email: body.email.clone(),
                first_name: body.first_name.clone(),
                last_name: body.last_name.clone(),
                username: body.username.clone(),
                billing: body.billing.clone().unwrap_or_default(),
                shipping: body.shipping.clone().unwrap_or_default(),
            };
            state.customers.push(customer.clone());
            Ok(customer)
        })
        .await
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        body: &CustomerPatch,
    ) -> Result<Customer, WooError> {
        self.respond("update_customer", args![id], |state| {
            let customer = state
                .customers
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| not_found("customer"))?;
            if let Some(email) = &body.email {
                customer.email.clone_from(email);
            }
            if let Some(first_name) = &body.first_name {
                customer.first_name.clone_from(first_name);
            }
            if let Some(last_name) = &body.last_name {
                customer.last_name.clone_from(last_name);
            }
            if let Some(billing) = &body.billing {
                customer.billing = billing.clone();
            }
            if let Some(shipping) = &body.shipping {
                customer.shipping = shipping.clone();
            }
            Ok(customer.clone())
        })
        .await
    }

    async fn order(&self, id: OrderId) -> Result<Order, WooError> {
        self.respond("order", args![id], |state| {
            state
                .orders
                .iter()
                .find(|o| o.id == id)
                .cloned()
                .ok_or_else(|| not_found("order"))
        })
        .await
    }

    async fn create_order(&self, body: &NewOrder) -> Result<Order, WooError> {
        self.respond("create_order", args![body.line_items.len()], |state| {
            let id = OrderId::new(state.next_id());
            let line_items = body
                .line_items
                .iter()
                .filter(|line| line.quantity > 0)
                .map(|line| LineItem {
                    id: LineItemId::new(state.next_id()),
                    product_id: line.product_id,
                    name: String::new(),
                    quantity: line.quantity,
                    total: None,
                })
                .collect();
            let order = Order {
                id,
                status: body.status.clone().unwrap_or_default(),
                currency: String::new(),
                total: None,
                customer_id: body.customer_id.map_or(0, |c| c.as_i64()),
                billing: body.billing.clone().unwrap_or_default(),
                shipping: body.shipping.clone().unwrap_or_default(),
                line_items,
                coupon_lines: body.coupon_lines.clone(),
                date_created: None,
            };
            state.orders.push(order.clone());
            Ok(order)
        })
        .await
    }

    async fn update_order(&self, id: OrderId, body: &NewOrder) -> Result<Order, WooError> {
        self.respond("update_order", args![id, body.line_items.len()], |state| {
            let fresh_ids: Vec<_> = body
                .line_items
                .iter()
                .map(|_| LineItemId::new(state.next_id()))
                .collect();
            let order = state
                .orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| not_found("order"))?;

            for (line, fresh_id) in body.line_items.iter().zip(fresh_ids) {
                match line.id {
                    Some(line_id) if line.quantity == 0 => {
                        order.line_items.retain(|existing| existing.id != line_id);
                    }
                    Some(line_id) => {
                        if let Some(existing) =
                            order.line_items.iter_mut().find(|e| e.id == line_id)
                        {
                            existing.quantity = line.quantity;
                        }
                    }
                    None if line.quantity > 0 => order.line_items.push(LineItem {
                        id: fresh_id,
                        product_id: line.product_id,
                        name: String::new(),
                        quantity: line.quantity,
                        total: None,
                    }),
                    None => {}
                }
            }
            if let Some(status) = &body.status {
                order.status = status.clone();
            }
            if let Some(customer_id) = body.customer_id {
                order.customer_id = customer_id.as_i64();
            }
            if let Some(billing) = &body.billing {
                order.billing = billing.clone();
            }
            if let Some(shipping) = &body.shipping {
                order.shipping = shipping.clone();
            }
            if !body.coupon_lines.is_empty() {
                order.coupon_lines = body.coupon_lines.clone();
            }
            Ok(order.clone())
        })
        .await
    }

    async fn reviews(
        &self,
        product_id: ProductId,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Review>, WooError> {
        self.respond("reviews", args![product_id, page, per_page], |state| {
            let for_product: Vec<_> = state
                .reviews
                .iter()
                .filter(|r| r.product_id == product_id)
                .cloned()
                .collect();
            Ok(page_of(&for_product, page, per_page))
        })
        .await
    }

    async fn create_review(&self, body: &NewReview) -> Result<Review, WooError> {
        self.respond(
            "create_review",
            args![body.product_id, body.rating],
            |state| {
                let review = Review {
                    id: ReviewId::new(state.next_id()),
                    product_id: body.product_id,
                    reviewer: body.reviewer.clone(),
                    reviewer_email: body.reviewer_email.clone(),
                    review: body.review.clone(),
                    rating: body.rating,
                    verified: false,
                    date_created: None,
                };
                state.reviews.push(review.clone());
                Ok(review)
            },
        )
        .await
    }

    async fn coupon_by_code(&self, code: &str) -> Result<Coupon, WooError> {
        self.respond("coupon_by_code", args![code], |state| {
            state
                .coupons
                .iter()
                .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
                .cloned()
                .ok_or_else(|| not_found("coupon with that code"))
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, category: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "price": "5.00",
            "categories": [{"id": category, "name": "Cat"}],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let stub = StubDataSource::new();
        stub.latest_products(2, 10).await.unwrap();
        stub.sort_and_filter(100, "shoe", "price", "", "10", None)
            .await
            .unwrap();

        assert_eq!(
            stub.calls(),
            vec![
                Call {
                    method: "latest_products",
                    args: vec!["2".into(), "10".into()],
                },
                Call {
                    method: "sort_and_filter",
                    args: vec![
                        "100".into(),
                        "shoe".into(),
                        "price".into(),
                        String::new(),
                        "10".into(),
                        "none".into()
                    ],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_pages_through_products() {
        let products = (1..=5).map(|i| product(i, "Item", 1)).collect();
        let stub = StubDataSource::new().with_products(products);

        let page = stub.best_products(2, 2).await.unwrap();
        assert_eq!(
            page.iter().map(|p| p.id.as_i64()).collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert!(stub.best_products(4, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_and_category_filter() {
        let stub = StubDataSource::new().with_products(vec![
            product(1, "Red Shoe", 10),
            product(2, "Blue Shoe", 20),
            product(3, "Sock", 10),
        ]);

        assert_eq!(stub.search(100, "shoe").await.unwrap().len(), 2);
        let filtered = stub
            .sort_and_filter(100, "shoe", "date", "", "", Some(CategoryId::new(20)))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, ProductId::new(2));
    }

    #[tokio::test]
    async fn test_failing_method() {
        let stub = StubDataSource::new().failing("product", 404, "gone");
        let err = stub.product(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, WooError::NotFound(ref m) if m == "gone"));
        assert_eq!(stub.call_count("product"), 1);
    }

    #[tokio::test]
    async fn test_order_lifecycle() {
        let stub = StubDataSource::new();
        let order = stub
            .create_order(&NewOrder::with_lines([(ProductId::new(7), 2)]))
            .await
            .unwrap();
        let line_id = order.line_items[0].id;

        let mut update = NewOrder::with_lines([(ProductId::new(9), 1)]);
        update.line_items.push(woostore_core::NewLineItem {
            id: Some(line_id),
            product_id: ProductId::new(7),
            quantity: 0,
        });
        let updated = stub.update_order(order.id, &update).await.unwrap();

        assert_eq!(updated.line_items.len(), 1);
        assert_eq!(updated.line_items[0].product_id, ProductId::new(9));
        assert_eq!(stub.order(order.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_special_offers_requires_configuration() {
        let stub = StubDataSource::new().with_products(vec![product(5, "Deal", 1)]);
        assert!(matches!(
            stub.special_offers().await,
            Err(WooError::NotFound(_))
        ));

        let stub = StubDataSource::new()
            .with_products(vec![product(5, "Deal", 1)])
            .with_special_offers(ProductId::new(5));
        assert_eq!(stub.special_offers().await.unwrap().name, "Deal");
    }
}
