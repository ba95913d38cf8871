use tokio::task::AbortHandle;
use woostore_core::Product;

use super::{ScreenScope, Slot};
use crate::repository::Repository;

/// Home screen: three ranked product rows and the special offers slider.
#[derive(Debug)]
pub struct HomeScreen {
    repository: Repository,
    scope: ScreenScope,
    per_page: u32,
    latest: Slot<Vec<Product>>,
    best: Slot<Vec<Product>>,
    favourite: Slot<Vec<Product>>,
    special_offers: Slot<Product>,
    running: [Option<AbortHandle>; 4],
}

impl HomeScreen {
    /// Create the screen and start loading page 1 of every row.
    #[must_use]
    pub fn new(repository: Repository, per_page: u32) -> Self {
        let mut screen = Self {
            repository,
            scope: ScreenScope::new(),
            per_page,
            latest: Slot::loading(),
            best: Slot::loading(),
            favourite: Slot::loading(),
            special_offers: Slot::loading(),
            running: Default::default(),
        };
        screen.refresh();
        screen
    }

    /// Re-request every row.
    pub fn refresh(&mut self) {
        let [latest, best, favourite, special_offers] = &mut self.running;
        let per_page = self.per_page;

        self.scope.relaunch(
            latest,
            self.repository.latest_products(1, per_page),
            &self.latest,
        );
        self.scope.relaunch(
            best,
            self.repository.best_products(1, per_page),
            &self.best,
        );
        self.scope.relaunch(
            favourite,
            self.repository.favourite_products(1, per_page),
            &self.favourite,
        );
        self.scope.relaunch(
            special_offers,
            self.repository.special_offers(),
            &self.special_offers,
        );
    }

    #[must_use]
    pub const fn latest(&self) -> &Slot<Vec<Product>> {
        &self.latest
    }

    #[must_use]
    pub const fn best(&self) -> &Slot<Vec<Product>> {
        &self.best
    }

    #[must_use]
    pub const fn favourite(&self) -> &Slot<Vec<Product>> {
        &self.favourite
    }

    #[must_use]
    pub const fn special_offers(&self) -> &Slot<Product> {
        &self.special_offers
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

    use woostore_core::ProductId;

    use super::*;
    use crate::screens::fixtures::product;
    use crate::source::stub::StubDataSource;
    use crate::woo::WooError;

    #[tokio::test]
    async fn test_rows_start_loading_and_settle() {
        let stub = Arc::new(
            StubDataSource::new()
                .with_products(vec![product(1, "Red Shoe", "10.00")])
                .with_special_offers(ProductId::new(1)),
        );
        let screen = HomeScreen::new(Repository::shared(Arc::clone(&stub)), 20);

        assert!(screen.latest().latest().unwrap().is_loading());

        assert_eq!(screen.latest().settled().await.success().unwrap().len(), 1);
        assert_eq!(screen.best().settled().await.success().unwrap().len(), 1);
        assert_eq!(screen.favourite().settled().await.success().unwrap().len(), 1);
        assert_eq!(
            screen.special_offers().settled().await.success().unwrap().name,
            "Red Shoe"
        );
        assert_eq!(stub.calls_to("latest_products"), vec![vec!["1", "20"]]);

        screen.destroy().await;
    }

    #[tokio::test]
    async fn test_failed_row_leaves_others_intact() {
        let stub = Arc::new(
            StubDataSource::new()
                .with_products(vec![product(1, "Red Shoe", "10.00")])
                .failing("best_products", 500, "ranking unavailable"),
        );
        let screen = HomeScreen::new(Repository::shared(stub), 20);

        assert!(matches!(
            screen.best().settled().await.error(),
            Some(WooError::Api { status: 500, .. })
        ));
        assert_eq!(screen.latest().settled().await.success().unwrap().len(), 1);
        assert!(screen.special_offers().settled().await.error().is_some());

        screen.destroy().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_mid_flight_leaves_loading() {
        let stub = Arc::new(
            StubDataSource::new()
                .with_products(vec![product(1, "Red Shoe", "10.00")])
                .with_delay(Duration::from_secs(5)),
        );
        let screen = HomeScreen::new(Repository::shared(Arc::clone(&stub)), 20);
        let latest = screen.latest().clone();
        tokio::task::yield_now().await;

        screen.destroy().await;
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(latest.latest().unwrap().is_loading());
    }

    #[tokio::test]
    async fn test_refresh_requests_again() {
        let stub = Arc::new(StubDataSource::new());
        let mut screen = HomeScreen::new(Repository::shared(Arc::clone(&stub)), 20);
        screen.latest().settled().await;

        screen.refresh();
        assert!(screen.latest().latest().unwrap().is_loading());
        assert!(screen.best().latest().unwrap().is_loading());

        screen.latest().settled().await;
        screen.best().settled().await;
        assert_eq!(stub.call_count("latest_products"), 2);
        assert_eq!(stub.call_count("best_products"), 2);
        screen.destroy().await;
    }
}
