//! Product detail, cart, coupons and customer accounts.

use futures::StreamExt;
use futures::future::join_all;
use woostore_core::{Email, OrderId, Product, ProductId};
use woostore_storefront::repository::Repository;
use woostore_storefront::screens::{AccountScreen, CartScreen, DetailScreen};

use super::{CommandError, report, require};

pub async fn product(repository: Repository, id: i64) -> Result<(), CommandError> {
    let screen = DetailScreen::new(repository, ProductId::new(id));

    let result = async {
        require("product", screen.product()).await?;
        report("reviews", screen.reviews()).await.map(|_| ())
    }
    .await;

    screen.destroy().await;
    result
}

/// Print the cart of a pending order.
///
/// The cart screen pairs order lines with products fetched elsewhere, so
/// the products on the order are fetched first to stand in for them. The
/// order itself is fetched once.
pub async fn cart(repository: Repository, order_id: i64) -> Result<(), CommandError> {
    let lines = repository.items_in_cart(OrderId::new(order_id)).await;
    let catalog: Vec<Product> = join_all(
        lines
            .iter()
            .map(|line| fetch_product(&repository, line.product_id)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    let mut screen = CartScreen::new(repository);
    screen.show_lines(&lines, &catalog);

    let result = require("items", screen.items()).await.map(|_| ());
    screen.destroy().await;
    result
}

async fn fetch_product(repository: &Repository, id: ProductId) -> Option<Product> {
    let mut states = repository.product(id);
    let mut last = None;
    while let Some(state) = states.next().await {
        last = state.into_success();
    }
    last
}

pub async fn coupon(repository: Repository, code: &str) -> Result<(), CommandError> {
    let mut screen = CartScreen::new(repository);
    screen.apply_coupon(code);

    let result = require("coupon", screen.coupon()).await.map(|_| ());
    screen.destroy().await;
    result
}

pub async fn customer(repository: Repository, email: &str) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let mut screen = AccountScreen::new(repository);
    screen.find(&email);

    let result = require("customer", screen.customer()).await.map(|_| ());
    screen.destroy().await;
    result
}
