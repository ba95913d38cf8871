use tokio::task::AbortHandle;
use woostore_core::{CartItem, CartLine, Coupon, NewLineItem, NewOrder, Order, OrderId, Product};

use super::{ScreenScope, Slot};
use crate::repository::{LoadState, Repository};

/// Cart screen.
///
/// The cart is the shopper's pending order projected onto products that
/// were already fetched elsewhere (home rows, search, detail).
#[derive(Debug)]
pub struct CartScreen {
    repository: Repository,
    scope: ScreenScope,
    items: Slot<Vec<CartItem>>,
    coupon: Slot<Coupon>,
    order: Slot<Order>,
    running_items: Option<AbortHandle>,
    running_coupon: Option<AbortHandle>,
    running_order: Option<AbortHandle>,
}

impl CartScreen {
    #[must_use]
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            scope: ScreenScope::new(),
            items: Slot::absent(),
            coupon: Slot::absent(),
            order: Slot::absent(),
            running_items: None,
            running_coupon: None,
            running_order: None,
        }
    }

    /// Load the cart of `order_id` and pair its lines with `catalog`.
    ///
    /// Never ends in `Error`: an order that cannot be fetched shows as an
    /// empty cart.
    pub fn items_in_cart(&mut self, order_id: OrderId, catalog: Vec<Product>) {
        if let Some(handle) = self.running_items.take() {
            handle.abort();
        }
        let repository = self.repository.clone();
        let items = self.items.clone();
        let generation = items.begin(true);

        self.running_items = Some(self.scope.spawn(async move {
            let lines = repository.items_in_cart(order_id).await;
            items.set_for(generation, LoadState::Success(CartItem::pair(&lines, &catalog)));
        }));
    }

    /// Show order lines the caller already fetched, paired with `catalog`.
    ///
    /// Replaces whatever [`Self::items_in_cart`] is still loading.
    pub fn show_lines(&mut self, lines: &[CartLine], catalog: &[Product]) {
        if let Some(handle) = self.running_items.take() {
            handle.abort();
        }
        self.items
            .set(LoadState::Success(CartItem::pair(lines, catalog)));
    }

    pub fn apply_coupon(&mut self, code: &str) {
        let stream = self.repository.coupon_by_code(code);
        self.scope
            .relaunch(&mut self.running_coupon, stream, &self.coupon);
    }

    /// Send new quantities for the order's lines. A quantity of `0`
    /// removes the line.
    pub fn update_quantities(&mut self, order_id: OrderId, lines: Vec<NewLineItem>) {
        let body = NewOrder {
            line_items: lines,
            ..NewOrder::default()
        };
        let stream = self.repository.update_order(order_id, body);
        self.scope
            .relaunch_mutation(&mut self.running_order, stream, &self.order);
    }

    #[must_use]
    pub const fn items(&self) -> &Slot<Vec<CartItem>> {
        &self.items
    }

    #[must_use]
    pub const fn coupon(&self) -> &Slot<Coupon> {
        &self.coupon
    }

    #[must_use]
    pub const fn order(&self) -> &Slot<Order> {
        &self.order
    }

    pub async fn destroy(self) {
        self.scope.destroy().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use woostore_core::{Price, ProductId};

    use super::*;
    use crate::screens::fixtures::product;
    use crate::source::stub::StubDataSource;
    use crate::woo::WooError;

    fn order(id: i64, lines: &[(i64, i64, u32)]) -> Order {
        let line_items: Vec<_> = lines
            .iter()
            .map(|(line_id, product_id, quantity)| {
                serde_json::json!({"id": line_id, "product_id": product_id, "quantity": quantity})
            })
            .collect();
        serde_json::from_value(serde_json::json!({"id": id, "line_items": line_items})).unwrap()
    }

    fn coupon(code: &str) -> Coupon {
        serde_json::from_value(serde_json::json!({
            "id": 720,
            "code": code,
            "amount": "10.00",
            "discount_type": "percent",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_items_pair_order_with_catalog() {
        let stub = Arc::new(
            StubDataSource::new().with_orders(vec![order(42, &[(1, 7, 2), (2, 9, 1)])]),
        );
        let mut screen = CartScreen::new(Repository::shared(stub));
        let catalog = vec![product(9, "Sock", "2.50"), product(7, "Red Shoe", "10.00")];

        screen.items_in_cart(OrderId::new(42), catalog);
        let items = screen.items().settled().await.into_success().unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product.id, ProductId::new(7));
        assert_eq!(items[0].quantity, 2);
        assert_eq!(CartItem::subtotal(&items), Price::parse("22.50").unwrap());
        screen.destroy().await;
    }

    #[tokio::test]
    async fn test_unreachable_order_is_empty_cart() {
        let stub = Arc::new(StubDataSource::new().failing("order", 500, "offline"));
        let mut screen = CartScreen::new(Repository::shared(stub));

        screen.items_in_cart(OrderId::new(42), vec![product(7, "Red Shoe", "10.00")]);

        assert!(screen.items().settled().await.into_success().unwrap().is_empty());
        screen.destroy().await;
    }

    #[tokio::test]
    async fn test_apply_coupon() {
        let stub = Arc::new(StubDataSource::new().with_coupons(vec![coupon("summer10")]));
        let mut screen = CartScreen::new(Repository::shared(Arc::clone(&stub)));

        screen.apply_coupon("SUMMER10");
        assert_eq!(
            screen.coupon().settled().await.success().unwrap().code,
            "summer10"
        );

        screen.apply_coupon("nope");
        assert!(screen.coupon().latest().unwrap().is_loading());
        assert!(matches!(
            screen.coupon().settled().await.error(),
            Some(WooError::NotFound(_))
        ));
        assert_eq!(stub.call_count("coupon_by_code"), 2);
        screen.destroy().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reloading_cart_hides_previous_items() {
        let stub = Arc::new(
            StubDataSource::new()
                .with_orders(vec![order(42, &[(1, 7, 2)])])
                .with_delay(Duration::from_secs(1)),
        );
        let mut screen = CartScreen::new(Repository::shared(stub));
        let catalog = vec![product(7, "Red Shoe", "10.00")];

        screen.items_in_cart(OrderId::new(42), catalog.clone());
        assert_eq!(screen.items().settled().await.success().map(Vec::len), Some(1));

        screen.items_in_cart(OrderId::new(43), catalog);
        assert!(screen.items().latest().unwrap().is_loading());
        assert_eq!(screen.items().settled().await.success().map(Vec::len), Some(0));
        screen.destroy().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_lines_pairs_without_fetching() {
        let stub = Arc::new(
            StubDataSource::new()
                .with_orders(vec![order(42, &[(1, 7, 5)])])
                .with_delay(Duration::from_secs(1)),
        );
        let mut screen = CartScreen::new(Repository::shared(Arc::clone(&stub)));
        let catalog = vec![product(7, "Red Shoe", "10.00")];
        let lines = [CartLine::new(ProductId::new(7), 2)];

        // The slower fetch must not overwrite the lines shown afterwards.
        screen.items_in_cart(OrderId::new(42), catalog.clone());
        screen.show_lines(&lines, &catalog);
        tokio::time::sleep(Duration::from_secs(2)).await;

        let items = screen.items().latest().unwrap().into_success().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        screen.destroy().await;
    }

    #[tokio::test]
    async fn test_update_quantities_removes_zero_lines() {
        let stub = Arc::new(
            StubDataSource::new().with_orders(vec![order(42, &[(1, 7, 2), (2, 9, 1)])]),
        );
        let mut screen = CartScreen::new(Repository::shared(stub));

        screen.update_quantities(
            OrderId::new(42),
            vec![NewLineItem {
                id: Some(woostore_core::LineItemId::new(2)),
                product_id: ProductId::new(9),
                quantity: 0,
            }],
        );

        let order = screen.order().settled().await.into_success().unwrap();
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(order.line_items[0].product_id, ProductId::new(7));
        screen.destroy().await;
    }
}
