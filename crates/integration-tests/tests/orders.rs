//! Cart, orders, reviews and coupons against the fake store over HTTP.

use serde_json::Value;
use woostore_core::{
    LineItemId, NewLineItem, NewOrder, NewReview, OrderId, OrderStatus, Product, ProductId,
};
use woostore_integration_tests::{FakeStore, coupon_json, order_json, product_json};
use woostore_storefront::screens::{CartScreen, DetailScreen};
use woostore_storefront::woo::WooError;

fn shop() -> FakeStore {
    FakeStore::new()
        .with_products(vec![
            product_json(1, "Blue Mug", "4.00", &[10]),
            product_json(4, "Travel Mug", "9.00", &[10]),
            product_json(5, "Poster", "15.00", &[20]),
        ])
        .with_orders(vec![order_json(900, &[(31, 1, 2), (32, 4, 1)])])
        .with_coupons(vec![coupon_json(60, "SPRING10", "10.00")])
}

fn fetched(products: &[Value]) -> Vec<Product> {
    products
        .iter()
        .map(|p| serde_json::from_value(p.clone()).expect("fixture should deserialize"))
        .collect()
}

#[tokio::test]
async fn test_create_cart_posts_a_pending_order() {
    let running = shop().spawn().await.expect("fake store should start");
    let mut screen = DetailScreen::new(running.repository(None).expect("repository"), ProductId::new(1));

    screen.create_cart(NewOrder::with_lines([(ProductId::new(1), 2), (ProductId::new(4), 1)]));
    let order = screen.order().settled().await;
    let order = order.success().expect("order should be created");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.item_count(), 3);
    assert_eq!(order.total.map(|t| t.to_string()), Some("17.00".to_string()));
    let names: Vec<&str> = order.line_items.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Blue Mug", "Travel Mug"]);
    screen.destroy().await;

    let posts = running.store.requests_to("orders");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].method, "POST");
}

#[tokio::test]
async fn test_cart_pairs_order_lines_with_fetched_products() {
    let store = shop();
    let catalog = fetched(&[product_json(4, "Travel Mug", "9.00", &[10]), product_json(1, "Blue Mug", "4.00", &[10])]);
    let running = store.spawn().await.expect("fake store should start");
    let mut screen = CartScreen::new(running.repository(None).expect("repository"));

    screen.items_in_cart(OrderId::new(900), catalog);
    let items = screen.items().settled().await;
    let pairs: Vec<(i64, u32)> = items
        .success()
        .expect("cart never fails")
        .iter()
        .map(|item| (item.product.id.as_i64(), item.quantity))
        .collect();

    assert_eq!(pairs, vec![(1, 2), (4, 1)]);
    screen.destroy().await;
}

#[tokio::test]
async fn test_cart_skips_lines_whose_product_was_not_fetched() {
    let running = shop().spawn().await.expect("fake store should start");
    let mut screen = CartScreen::new(running.repository(None).expect("repository"));

    screen.items_in_cart(OrderId::new(900), fetched(&[product_json(4, "Travel Mug", "9.00", &[10])]));
    let items = screen.items().settled().await;

    assert_eq!(items.success().map(Vec::len), Some(1));
    screen.destroy().await;
}

#[tokio::test]
async fn test_unreachable_order_shows_an_empty_cart() {
    let running = shop().spawn().await.expect("fake store should start");
    running.store.fail("orders/900", 503);
    let mut screen = CartScreen::new(running.repository(None).expect("repository"));

    screen.items_in_cart(OrderId::new(900), fetched(&[product_json(1, "Blue Mug", "4.00", &[])]));
    let items = screen.items().settled().await;

    assert_eq!(items.success().map(Vec::len), Some(0));
    screen.destroy().await;
}

#[tokio::test]
async fn test_update_quantities_removes_and_adds_lines() {
    let running = shop().spawn().await.expect("fake store should start");
    let mut screen = CartScreen::new(running.repository(None).expect("repository"));

    screen.update_quantities(
        OrderId::new(900),
        vec![
            NewLineItem {
                id: Some(LineItemId::new(31)),
                product_id: ProductId::new(1),
                quantity: 0,
            },
            NewLineItem::new(ProductId::new(5), 2),
        ],
    );
    let order = screen.order().settled().await;
    let order = order.success().expect("update should succeed");
    let lines: Vec<(i64, u32)> = order
        .line_items
        .iter()
        .map(|l| (l.product_id.as_i64(), l.quantity))
        .collect();

    assert_eq!(lines, vec![(4, 1), (5, 2)]);
    assert_eq!(order.total.map(|t| t.to_string()), Some("39.00".to_string()));
    screen.destroy().await;

    let stored = running.store.order(900).expect("order should still exist");
    assert_eq!(stored["line_items"].as_array().map(Vec::len), Some(2));
    assert_eq!(running.store.requests_to("orders/900")[0].method, "PUT");
}

#[tokio::test]
async fn test_updating_a_missing_order_is_not_found() {
    let running = shop().spawn().await.expect("fake store should start");
    let mut screen = CartScreen::new(running.repository(None).expect("repository"));

    screen.update_quantities(OrderId::new(1), vec![NewLineItem::new(ProductId::new(1), 1)]);
    let order = screen.order().settled().await;

    assert!(matches!(order.error(), Some(WooError::NotFound(_))));
    screen.destroy().await;
}

#[tokio::test]
async fn test_apply_coupon_looks_up_by_code() {
    let running = shop().spawn().await.expect("fake store should start");
    let mut screen = CartScreen::new(running.repository(None).expect("repository"));

    screen.apply_coupon(" spring10 ");
    let coupon = screen.coupon().settled().await;
    let coupon = coupon.success().expect("coupon should be found");
    assert_eq!(coupon.code, "SPRING10");
    assert_eq!(coupon.amount.map(|a| a.to_string()), Some("10.00".to_string()));
    screen.destroy().await;

    let request = &running.store.requests_to("coupons")[0];
    assert_eq!(request.param("code"), Some("spring10"));
}

#[tokio::test]
async fn test_unknown_coupon_is_not_found() {
    let running = shop().spawn().await.expect("fake store should start");
    let mut screen = CartScreen::new(running.repository(None).expect("repository"));

    screen.apply_coupon("NOPE");
    let coupon = screen.coupon().settled().await;

    assert!(matches!(coupon.error(), Some(WooError::NotFound(_))));
    screen.destroy().await;
}

#[tokio::test]
async fn test_submit_review_returns_the_stored_review() {
    let running = shop().spawn().await.expect("fake store should start");
    let mut screen = DetailScreen::new(running.repository(None).expect("repository"), ProductId::new(5));

    screen.submit_review(NewReview::new(
        ProductId::new(5),
        "Sam",
        "sam@example.com",
        "Great colours.",
        9,
    ));
    let review = screen.review().settled().await;
    let review = review.success().expect("review should be created");

    assert_eq!(review.product_id, ProductId::new(5));
    assert_eq!(review.rating, 5);
    assert!(!review.verified);
    screen.destroy().await;

    let posts = running.store.requests_to("products/reviews");
    assert!(posts.iter().any(|r| r.method == "POST"));
}
