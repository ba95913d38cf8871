use tokio::task::AbortHandle;
use woostore_core::{NewOrder, NewReview, Order, OrderId, Product, ProductId, Review};

use super::{ScreenScope, Slot};
use crate::repository::Repository;

/// Reviews shown under a product.
pub const REVIEWS_PER_PAGE: u32 = 20;

/// Product detail: the product, its reviews, and the shopper's actions on
/// it (putting it in the cart, reviewing it).
#[derive(Debug)]
pub struct DetailScreen {
    repository: Repository,
    scope: ScreenScope,
    product_id: ProductId,
    product: Slot<Product>,
    reviews: Slot<Vec<Review>>,
    order: Slot<Order>,
    review: Slot<Review>,
    running_order: Option<AbortHandle>,
}

impl DetailScreen {
    /// Create the screen and load the product and its first reviews.
    #[must_use]
    pub fn new(repository: Repository, product_id: ProductId) -> Self {
        let mut scope = ScreenScope::new();
        let product = Slot::loading();
        let reviews = Slot::loading();
        scope.launch(repository.product(product_id), &product);
        scope.launch(
            repository.reviews(product_id, 1, REVIEWS_PER_PAGE),
            &reviews,
        );

        Self {
            repository,
            scope,
            product_id,
            product,
            reviews,
            order: Slot::absent(),
            review: Slot::absent(),
            running_order: None,
        }
    }

    /// Create the order that backs the shopper's cart.
    pub fn create_cart(&mut self, order: NewOrder) {
        let stream = self.repository.create_order(order);
        self.scope
            .relaunch_mutation(&mut self.running_order, stream, &self.order);
    }

    /// Replace the cart order's contents.
    pub fn update_order(&mut self, id: OrderId, order: NewOrder) {
        let stream = self.repository.update_order(id, order);
        self.scope
            .relaunch_mutation(&mut self.running_order, stream, &self.order);
    }

    pub fn submit_review(&mut self, review: NewReview) {
        self.scope
            .launch(self.repository.create_review(review), &self.review);
    }

    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product_id
    }

    #[must_use]
    pub const fn product(&self) -> &Slot<Product> {
        &self.product
    }

    #[must_use]
    pub const fn reviews(&self) -> &Slot<Vec<Review>> {
        &self.reviews
    }

    /// Result of the latest cart mutation; absent until one is made.
    #[must_use]
    pub const fn order(&self) -> &Slot<Order> {
        &self.order
    }

    /// Result of the latest review submission; absent until one is made.
    #[must_use]
    pub const fn review(&self) -> &Slot<Review> {
        &self.review
    }

    pub async fn destroy(self) {
        self.scope.destroy().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::screens::fixtures::product;
    use crate::source::stub::StubDataSource;

    fn review(id: i64, product_id: i64) -> Review {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "product_id": product_id,
            "reviewer": "Jane",
            "review": "Comfy",
            "rating": 4,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_loads_product_and_its_reviews() {
        let stub = Arc::new(
            StubDataSource::new()
                .with_products(vec![product(7, "Red Shoe", "30.00")])
                .with_reviews(vec![review(1, 7), review(2, 8)]),
        );
        let screen = DetailScreen::new(Repository::shared(Arc::clone(&stub)), ProductId::new(7));

        assert_eq!(screen.product().settled().await.success().unwrap().name, "Red Shoe");
        assert_eq!(screen.reviews().settled().await.success().unwrap().len(), 1);
        assert!(screen.order().latest().is_none());
        assert!(screen.review().latest().is_none());
        assert_eq!(stub.calls_to("reviews"), vec![vec!["7", "1", "20"]]);
        screen.destroy().await;
    }

    #[tokio::test]
    async fn test_cart_mutations_skip_loading() {
        let stub = Arc::new(
            StubDataSource::new().with_products(vec![product(7, "Red Shoe", "30.00")]),
        );
        let mut screen =
            DetailScreen::new(Repository::shared(Arc::clone(&stub)), ProductId::new(7));
        let mut observer = screen.order().subscribe();

        screen.create_cart(NewOrder::with_lines([(ProductId::new(7), 1)]));
        observer.changed().await.unwrap();
        let first = observer.borrow_and_update().clone().unwrap();
        assert!(first.is_terminal());
        let order = first.into_success().unwrap();

        screen.update_order(order.id, NewOrder::with_lines([(ProductId::new(9), 2)]));
        assert!(screen.order().latest().unwrap().is_terminal());
        observer.changed().await.unwrap();
        let updated = observer.borrow_and_update().clone().unwrap().into_success().unwrap();

        assert_eq!(updated.id, order.id);
        assert_eq!(updated.line_items.len(), 2);
        screen.destroy().await;
    }

    #[tokio::test]
    async fn test_submit_review() {
        let stub = Arc::new(StubDataSource::new());
        let mut screen =
            DetailScreen::new(Repository::shared(Arc::clone(&stub)), ProductId::new(7));

        screen.submit_review(NewReview::new(
            ProductId::new(7),
            "Jane",
            "jane@example.com",
            "Great fit",
            9,
        ));

        let review = screen.review().settled().await.into_success().unwrap();
        assert_eq!(review.rating, 5);
        assert!(screen.product().settled().await.error().is_some());
        screen.destroy().await;
    }
}
