//! Integration tests for woostore.
//!
//! [`FakeStore`] is an in-process WooCommerce REST server built with `axum`.
//! It serves seeded JSON records in the store's wire shape, checks
//! credentials, records every request and can be told to fail or stall.
//! Tests point a real [`RemoteDataSource`] at it over HTTP.
//!
//! ```rust,ignore
//! let store = FakeStore::new().with_products(vec![product_json(1, "Mug", "4.00", &[])]);
//! let running = store.spawn().await?;
//! let repository = running.repository(None)?;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use woostore_core::ProductId;
use woostore_storefront::config::{ConfigError, WooConfig};
use woostore_storefront::repository::Repository;
use woostore_storefront::source::RemoteDataSource;
use woostore_storefront::woo::WooClient;

/// Versioned REST root the fake store serves under.
pub const API_ROOT: &str = "/wp-json/wc/v3";
pub const CONSUMER_KEY: &str = "ck_0b6d2e7f4c1a9358e2d7c6b5a4f3e2d1c0b9a8f7";
pub const CONSUMER_SECRET: &str = "cs_9f8e7d6c5b4a3928171605f4e3d2c1b0a9f8e7d6";

/// Seconds the fake store asks clients to wait after a 429.
pub const RETRY_AFTER_SECS: u64 = 7;

/// A request as the fake store saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Path below [`API_ROOT`], e.g. `products/categories`.
    pub path: String,
    pub query: HashMap<String, String>,
}

impl RecordedRequest {
    /// Query parameter value, if sent.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

#[derive(Debug, Default)]
struct StoreData {
    products: Vec<Value>,
    categories: Vec<Value>,
    customers: Vec<Value>,
    orders: Vec<Value>,
    reviews: Vec<Value>,
    coupons: Vec<Value>,
    requests: Vec<RecordedRequest>,
    failures: HashMap<String, u16>,
    garbled: Vec<String>,
    delay: Option<Duration>,
    next_id: i64,
}

impl StoreData {
    const fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory WooCommerce REST API.
#[derive(Debug, Clone, Default)]
pub struct FakeStore {
    data: Arc<Mutex<StoreData>>,
}

impl FakeStore {
    #[must_use]
    pub fn new() -> Self {
        let store = Self::default();
        store.data().next_id = 5000;
        store
    }

    #[must_use]
    pub fn with_products(self, products: Vec<Value>) -> Self {
        self.data().products = products;
        self
    }

    #[must_use]
    pub fn with_categories(self, categories: Vec<Value>) -> Self {
        self.data().categories = categories;
        self
    }

    #[must_use]
    pub fn with_customers(self, customers: Vec<Value>) -> Self {
        self.data().customers = customers;
        self
    }

    #[must_use]
    pub fn with_orders(self, orders: Vec<Value>) -> Self {
        self.data().orders = orders;
        self
    }

    #[must_use]
    pub fn with_reviews(self, reviews: Vec<Value>) -> Self {
        self.data().reviews = reviews;
        self
    }

    #[must_use]
    pub fn with_coupons(self, coupons: Vec<Value>) -> Self {
        self.data().coupons = coupons;
        self
    }

    /// Answer every request to `path` (below [`API_ROOT`]) with `status`.
    pub fn fail(&self, path: &str, status: u16) {
        self.data().failures.insert(path.to_string(), status);
    }

    /// Answer every request to `path` with a body that is not JSON.
    pub fn garble(&self, path: &str) {
        self.data().garbled.push(path.to_string());
    }

    /// Hold every response for `delay`.
    pub fn stall(&self, delay: Duration) {
        self.data().delay = Some(delay);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.data().requests.clone()
    }

    /// Requests whose path is exactly `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.data()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    /// Stored order, as the store would return it.
    #[must_use]
    pub fn order(&self, id: i64) -> Option<Value> {
        find(&self.data().orders, id).cloned()
    }

    pub fn router(&self) -> Router {
        let api = |path: &str| format!("{API_ROOT}/{path}");

        Router::new()
            .route(&api("products"), get(list_products))
            .route(&api("products/categories"), get(list_categories))
            .route(
                &api("products/reviews"),
                get(list_reviews).post(create_review),
            )
            .route(&api("products/{id}"), get(get_product))
            .route(&api("customers"), get(list_customers).post(create_customer))
            .route(
                &api("customers/{id}"),
                get(get_customer).put(update_customer),
            )
            .route(&api("orders"), post(create_order))
            .route(&api("orders/{id}"), get(get_order).put(update_order))
            .route(&api("coupons"), get(list_coupons))
            .layer(middleware::from_fn_with_state(self.clone(), guard))
            .with_state(self.clone())
    }

    /// Serve on a random local port.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn spawn(self) -> std::io::Result<RunningStore> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(RunningStore {
            store: self,
            addr,
            task,
        })
    }

    fn data(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A fake store serving on a local port. Stops when dropped.
#[derive(Debug)]
pub struct RunningStore {
    pub store: FakeStore,
    pub addr: SocketAddr,
    task: JoinHandle<()>,
}

impl RunningStore {
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}{API_ROOT}", self.addr)
    }

    /// Client configuration with the fake store's credentials.
    ///
    /// # Errors
    ///
    /// Never fails for a running store; the result mirrors [`WooConfig::new`].
    pub fn config(&self) -> Result<WooConfig, ConfigError> {
        let mut config = WooConfig::new(&self.base_url(), CONSUMER_KEY, CONSUMER_SECRET)?;
        config.timeout = Duration::from_secs(5);
        Ok(config)
    }

    /// Data source talking to the fake store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn data_source(
        &self,
        special_offers: Option<ProductId>,
    ) -> Result<RemoteDataSource, Box<dyn std::error::Error>> {
        let client = WooClient::new(&self.config()?)?;
        Ok(RemoteDataSource::new(client, special_offers))
    }

    /// Type-erased repository over [`Self::data_source`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::data_source`].
    pub fn repository(
        &self,
        special_offers: Option<ProductId>,
    ) -> Result<Repository, Box<dyn std::error::Error>> {
        Ok(Repository::shared(Arc::new(
            self.data_source(special_offers)?,
        )))
    }
}

impl Drop for RunningStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Fixtures (WooCommerce wire shape)
// =============================================================================

#[must_use]
pub fn product_json(id: i64, name: &str, price: &str, categories: &[i64]) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "permalink": format!("https://shop.example/product/{id}/"),
        "date_created": format!("2024-01-{:02}T10:00:00", id.rem_euclid(28) + 1),
        "type": "simple",
        "status": "publish",
        "featured": false,
        "description": format!("<p>{name}</p>"),
        "short_description": "",
        "sku": format!("SKU-{id}"),
        "price": price,
        "regular_price": price,
        "sale_price": "",
        "on_sale": false,
        "purchasable": true,
        "total_sales": id * 3,
        "stock_status": "instock",
        "average_rating": "4.00",
        "rating_count": 2,
        "categories": categories
            .iter()
            .map(|c| json!({"id": c, "name": format!("Category {c}"), "slug": format!("category-{c}")}))
            .collect::<Vec<_>>(),
        "images": [{"id": id * 10, "src": format!("https://shop.example/img/{id}.jpg"), "name": name, "alt": ""}],
        "meta_data": [],
    })
}

#[must_use]
pub fn category_json(id: i64, name: &str, parent: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "slug": name.to_lowercase(),
        "parent": parent,
        "description": "",
        "display": "default",
        "image": null,
        "menu_order": 0,
        "count": 3,
    })
}

#[must_use]
pub fn customer_json(id: i64, email: &str, first_name: &str) -> Value {
    json!({
        "id": id,
        "date_created": "2024-02-01T09:00:00",
        "email": email,
        "first_name": first_name,
        "last_name": "",
        "role": "customer",
        "username": email.split('@').next().unwrap_or_default(),
        "billing": {"first_name": first_name, "email": email, "country": "US"},
        "shipping": {"first_name": first_name, "country": "US"},
        "is_paying_customer": false,
    })
}

/// Pending order with `(line id, product id, quantity)` lines.
#[must_use]
pub fn order_json(id: i64, lines: &[(i64, i64, u32)]) -> Value {
    json!({
        "id": id,
        "status": "pending",
        "currency": "USD",
        "date_created": "2024-03-01T12:00:00",
        "total": "0.00",
        "customer_id": 0,
        "billing": {},
        "shipping": {},
        "line_items": lines
            .iter()
            .map(|(line_id, product_id, quantity)| json!({
                "id": line_id,
                "name": format!("Product {product_id}"),
                "product_id": product_id,
                "variation_id": 0,
                "quantity": quantity,
                "total": "0.00",
            }))
            .collect::<Vec<_>>(),
        "coupon_lines": [],
    })
}

#[must_use]
pub fn review_json(id: i64, product_id: i64, rating: u8) -> Value {
    json!({
        "id": id,
        "date_created": "2024-04-01T08:30:00",
        "product_id": product_id,
        "status": "approved",
        "reviewer": "Jane Doe",
        "reviewer_email": "jane@example.com",
        "review": "<p>Lovely.</p>",
        "rating": rating,
        "verified": true,
    })
}

#[must_use]
pub fn coupon_json(id: i64, code: &str, amount: &str) -> Value {
    json!({
        "id": id,
        "code": code,
        "amount": amount,
        "discount_type": "percent",
        "description": "",
        "date_expires": null,
        "usage_count": 0,
        "individual_use": false,
        "minimum_amount": "0.00",
        "maximum_amount": "0.00",
        "free_shipping": false,
    })
}

// =============================================================================
// Middleware
// =============================================================================

/// Record the request, then apply injected failures, credentials and delay.
async fn guard(State(store): State<FakeStore>, request: Request, next: Next) -> Response {
    let path = request
        .uri()
        .path()
        .trim_start_matches(API_ROOT)
        .trim_start_matches('/')
        .to_string();
    let query = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .map(|Query(q)| q)
        .unwrap_or_default();
    let authorized = (query.get("consumer_key").map(String::as_str) == Some(CONSUMER_KEY)
        && query.get("consumer_secret").map(String::as_str) == Some(CONSUMER_SECRET))
        || request.headers().contains_key(header::AUTHORIZATION);

    let (failure, garbled, delay) = {
        let mut data = store.data();
        data.requests.push(RecordedRequest {
            method: request.method().to_string(),
            path: path.clone(),
            query,
        });
        (
            data.failures.get(&path).copied(),
            data.garbled.contains(&path),
            data.delay,
        )
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if !authorized {
        return woo_error(
            StatusCode::UNAUTHORIZED,
            "woocommerce_rest_cannot_view",
            "Sorry, you cannot list resources.",
        );
    }

    if let Some(status) = failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status == StatusCode::TOO_MANY_REQUESTS {
            return (
                status,
                [(header::RETRY_AFTER, RETRY_AFTER_SECS.to_string())],
                "slow down",
            )
                .into_response();
        }
        return woo_error(status, "fake_store_failure", "Injected failure.");
    }

    if garbled {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }

    next.run(request).await
}

fn woo_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({"code": code, "message": message, "data": {"status": status.as_u16()}})),
    )
        .into_response()
}

fn invalid_id() -> Response {
    woo_error(StatusCode::NOT_FOUND, "woocommerce_rest_invalid_id", "Invalid ID.")
}

// =============================================================================
// Handlers
// =============================================================================

type Params = Query<HashMap<String, String>>;

fn id_of(value: &Value) -> Option<i64> {
    value.get("id").and_then(Value::as_i64)
}

fn find(items: &[Value], id: i64) -> Option<&Value> {
    items.iter().find(|item| id_of(item) == Some(id))
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn price_of(product: &Value) -> Option<f64> {
    str_field(product, "price").parse().ok()
}

fn paginate(items: Vec<Value>, params: &HashMap<String, String>) -> Vec<Value> {
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: usize = params
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(10);
    items
        .into_iter()
        .skip(page.saturating_sub(1) * per_page)
        .take(per_page)
        .collect()
}

async fn list_products(State(store): State<FakeStore>, Query(params): Params) -> Json<Vec<Value>> {
    let search = params.get("search").map(|s| s.to_lowercase());
    let category: Option<i64> = params.get("category").and_then(|c| c.parse().ok());
    let min_price: Option<f64> = params.get("min_price").and_then(|p| p.parse().ok());
    let max_price: Option<f64> = params.get("max_price").and_then(|p| p.parse().ok());

    let mut products: Vec<Value> = store
        .data()
        .products
        .iter()
        .filter(|p| {
            search
                .as_ref()
                .is_none_or(|s| str_field(p, "name").to_lowercase().contains(s))
        })
        .filter(|p| {
            category.is_none_or(|c| {
                p.get("categories")
                    .and_then(Value::as_array)
                    .is_some_and(|cats| cats.iter().any(|cat| id_of(cat) == Some(c)))
            })
        })
        .filter(|p| min_price.is_none_or(|min| price_of(p).is_some_and(|price| price >= min)))
        .filter(|p| max_price.is_none_or(|max| price_of(p).is_some_and(|price| price <= max)))
        .cloned()
        .collect();

    let sorted = match params.get("orderby").map(String::as_str) {
        Some("price") => {
            products.sort_by(|a, b| {
                price_of(a)
                    .unwrap_or_default()
                    .total_cmp(&price_of(b).unwrap_or_default())
            });
            true
        }
        Some("date") => {
            products.sort_by(|a, b| str_field(a, "date_created").cmp(str_field(b, "date_created")));
            true
        }
        Some("popularity") => {
            products.sort_by_key(|p| p.get("total_sales").and_then(Value::as_i64));
            true
        }
        Some("title") => {
            products.sort_by(|a, b| str_field(a, "name").cmp(str_field(b, "name")));
            true
        }
        _ => false,
    };
    // The store sorts descending unless asked otherwise.
    if sorted && params.get("order").is_none_or(|o| o != "asc") {
        products.reverse();
    }

    Json(paginate(products, &params))
}

async fn get_product(State(store): State<FakeStore>, Path(id): Path<i64>) -> Response {
    find(&store.data().products, id)
        .cloned()
        .map_or_else(invalid_id, |p| Json(p).into_response())
}

async fn list_categories(State(store): State<FakeStore>, Query(params): Params) -> Json<Vec<Value>> {
    let categories = store.data().categories.clone();
    Json(paginate(categories, &params))
}

async fn list_reviews(State(store): State<FakeStore>, Query(params): Params) -> Json<Vec<Value>> {
    let product: Option<i64> = params.get("product").and_then(|p| p.parse().ok());
    let reviews = store
        .data()
        .reviews
        .iter()
        .filter(|r| product.is_none_or(|p| r.get("product_id").and_then(Value::as_i64) == Some(p)))
        .cloned()
        .collect();
    Json(paginate(reviews, &params))
}

async fn create_review(State(store): State<FakeStore>, Json(body): Json<Value>) -> Response {
    let mut data = store.data();
    let mut review = body;
    if let Some(fields) = review.as_object_mut() {
        fields.insert("id".into(), json!(data.next_id()));
        fields.insert("status".into(), json!("approved"));
        fields.insert("verified".into(), json!(false));
        fields.insert("date_created".into(), json!("2024-05-01T00:00:00"));
    }
    data.reviews.push(review.clone());
    (StatusCode::CREATED, Json(review)).into_response()
}

async fn list_customers(State(store): State<FakeStore>, Query(params): Params) -> Json<Vec<Value>> {
    let email = params.get("email").map(|e| e.to_lowercase());
    let customers = store
        .data()
        .customers
        .iter()
        .filter(|c| {
            email
                .as_ref()
                .is_none_or(|e| str_field(c, "email").to_lowercase() == *e)
        })
        .cloned()
        .collect();
    Json(paginate(customers, &params))
}

async fn create_customer(State(store): State<FakeStore>, Json(body): Json<Value>) -> Response {
    let mut data = store.data();
    let email = str_field(&body, "email").to_lowercase();
    if data
        .customers
        .iter()
        .any(|c| str_field(c, "email").to_lowercase() == email)
    {
        return woo_error(
            StatusCode::BAD_REQUEST,
            "registration-error-email-exists",
            "An account is already registered with your email address.",
        );
    }

    let mut customer = customer_json(data.next_id(), &email, str_field(&body, "first_name"));
    merge(&mut customer, &body);
    data.customers.push(customer.clone());
    (StatusCode::CREATED, Json(customer)).into_response()
}

async fn get_customer(State(store): State<FakeStore>, Path(id): Path<i64>) -> Response {
    find(&store.data().customers, id)
        .cloned()
        .map_or_else(invalid_id, |c| Json(c).into_response())
}

async fn update_customer(
    State(store): State<FakeStore>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = store.data();
    let Some(customer) = data.customers.iter_mut().find(|c| id_of(c) == Some(id)) else {
        return invalid_id();
    };
    merge(customer, &body);
    Json(customer.clone()).into_response()
}

async fn create_order(State(store): State<FakeStore>, Json(body): Json<Value>) -> Response {
    let mut data = store.data();
    let id = data.next_id();
    let mut order = order_json(id, &[]);
    if let Some(status) = body.get("status") {
        order["status"] = status.clone();
    }
    if let Some(customer_id) = body.get("customer_id") {
        order["customer_id"] = customer_id.clone();
    }
    apply_lines(&mut data, &mut order, &body);
    data.orders.push(order.clone());
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn get_order(State(store): State<FakeStore>, Path(id): Path<i64>) -> Response {
    find(&store.data().orders, id)
        .cloned()
        .map_or_else(invalid_id, |o| Json(o).into_response())
}

async fn update_order(
    State(store): State<FakeStore>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = store.data();
    let Some(index) = data.orders.iter().position(|o| id_of(o) == Some(id)) else {
        return invalid_id();
    };
    let mut order = data.orders.swap_remove(index);
    if let Some(status) = body.get("status") {
        order["status"] = status.clone();
    }
    apply_lines(&mut data, &mut order, &body);
    data.orders.push(order.clone());
    Json(order).into_response()
}

async fn list_coupons(State(store): State<FakeStore>, Query(params): Params) -> Json<Vec<Value>> {
    let code = params.get("code").map(|c| c.to_lowercase());
    let coupons = store
        .data()
        .coupons
        .iter()
        .filter(|c| {
            code.as_ref()
                .is_none_or(|code| str_field(c, "code").to_lowercase() == *code)
        })
        .cloned()
        .collect();
    Json(paginate(coupons, &params))
}

/// Shallow-merge the fields of `patch` into `target`.
fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Apply request line items the way the store does: lines with an `id`
/// update (quantity `0` removes), lines without one are added. Recomputes
/// line and order totals from product prices.
fn apply_lines(data: &mut StoreData, order: &mut Value, body: &Value) {
    let requested = body
        .get("line_items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut lines: Vec<Value> = order
        .get("line_items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for line in requested {
        let quantity = line.get("quantity").and_then(Value::as_u64).unwrap_or(0);
        match id_of(&line) {
            Some(line_id) if quantity == 0 => lines.retain(|l| id_of(l) != Some(line_id)),
            Some(line_id) => {
                if let Some(existing) = lines.iter_mut().find(|l| id_of(l) == Some(line_id)) {
                    existing["quantity"] = json!(quantity);
                }
            }
            None if quantity > 0 => {
                let product_id = line.get("product_id").and_then(Value::as_i64).unwrap_or(0);
                let mut fields = Map::new();
                fields.insert("id".into(), json!(data.next_id()));
                fields.insert("product_id".into(), json!(product_id));
                fields.insert("quantity".into(), json!(quantity));
                lines.push(Value::Object(fields));
            }
            None => {}
        }
    }

    let mut total = 0.0;
    for line in &mut lines {
        let product_id = line.get("product_id").and_then(Value::as_i64).unwrap_or(0);
        let quantity = line.get("quantity").and_then(Value::as_u64).unwrap_or(0);
        let product = find(&data.products, product_id);
        let price = product.and_then(price_of).unwrap_or_default();
        #[allow(clippy::cast_precision_loss)]
        let line_total = price * quantity as f64;
        total += line_total;
        line["name"] = json!(product.map_or("", |p| str_field(p, "name")));
        line["total"] = json!(format!("{line_total:.2}"));
    }

    order["line_items"] = Value::Array(lines);
    order["total"] = json!(format!("{total:.2}"));
}
