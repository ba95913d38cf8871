use tokio::task::AbortHandle;
use woostore_core::{CategoryId, Product};

use super::{LISTING_PAGE_SIZE, ScreenScope, Slot};
use crate::repository::Repository;

/// Search screen.
///
/// Plain searches share the `results` slot. Sorting and filtering hand back
/// a fresh slot per invocation so each refinement can be shown on its own.
#[derive(Debug)]
pub struct SearchScreen {
    repository: Repository,
    scope: ScreenScope,
    results: Slot<Vec<Product>>,
    running: Option<AbortHandle>,
}

impl SearchScreen {
    #[must_use]
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            scope: ScreenScope::new(),
            results: Slot::absent(),
            running: None,
        }
    }

    /// Search product names and descriptions, replacing earlier results.
    pub fn search(&mut self, query: &str) {
        let stream = self.repository.search(LISTING_PAGE_SIZE, query);
        self.scope
            .relaunch(&mut self.running, stream, &self.results);
    }

    /// Search ranked by `sort` (`date`, `price`, `popularity`, `rating`...).
    pub fn sort(&mut self, query: &str, sort: &str) -> Slot<Vec<Product>> {
        let slot = Slot::loading();
        self.scope
            .launch(self.repository.sort(LISTING_PAGE_SIZE, query, sort), &slot);
        slot
    }

    /// Search ranked by `sort` within a price band and optional category.
    ///
    /// An empty bound is unbounded.
    pub fn sort_and_filter(
        &mut self,
        query: &str,
        sort: &str,
        higher_price: &str,
        lower_price: &str,
        category_id: Option<CategoryId>,
    ) -> Slot<Vec<Product>> {
        let slot = Slot::loading();
        let stream = self.repository.sort_and_filter(
            LISTING_PAGE_SIZE,
            query,
            sort,
            higher_price,
            lower_price,
            category_id,
        );
        self.scope.launch(stream, &slot);
        slot
    }

    #[must_use]
    pub const fn results(&self) -> &Slot<Vec<Product>> {
        &self.results
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

    fn stub() -> Arc<StubDataSource> {
        Arc::new(StubDataSource::new().with_products(vec![
            product(1, "Red Shoe", "30.00"),
            product(2, "Blue Shoe", "25.00"),
            product(3, "Wool Hat", "15.00"),
        ]))
    }

    #[tokio::test]
    async fn test_search_fills_results() {
        let stub = stub();
        let mut screen = SearchScreen::new(Repository::shared(Arc::clone(&stub)));
        assert!(screen.results().latest().is_none());

        screen.search("shoe");

        assert_eq!(screen.results().settled().await.success().unwrap().len(), 2);
        assert_eq!(stub.calls_to("search"), vec![vec!["100", "shoe"]]);
        screen.destroy().await;
    }

    #[tokio::test]
    async fn test_each_refinement_gets_its_own_slot() {
        let stub = stub();
        let mut screen = SearchScreen::new(Repository::shared(Arc::clone(&stub)));

        let by_price = screen.sort("shoe", "price");
        let filtered =
            screen.sort_and_filter("shoe", "price", "", "10", Some(CategoryId::new(1)));

        assert!(by_price.latest().unwrap().is_loading());
        assert!(filtered.latest().unwrap().is_loading());
        assert_eq!(by_price.settled().await.success().unwrap().len(), 2);
        assert!(filtered.settled().await.is_terminal());
        assert!(screen.results().latest().is_none());
        assert_eq!(
            stub.calls_to("sort_and_filter"),
            vec![vec!["100", "shoe", "price", "", "10", "1"]]
        );
        screen.destroy().await;
    }

    #[tokio::test]
    async fn test_search_error_is_surfaced() {
        let stub = Arc::new(StubDataSource::new().failing("search", 400, "bad query"));
        let mut screen = SearchScreen::new(Repository::shared(stub));

        screen.search("?");

        assert!(screen.results().settled().await.error().is_some());
        screen.destroy().await;
    }
}
