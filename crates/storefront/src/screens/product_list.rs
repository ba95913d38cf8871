use tokio::task::AbortHandle;
use woostore_core::Product;

use super::{LISTING_PAGE_SIZE, ScreenScope, Slot};
use crate::repository::Repository;
use crate::source::ProductFacet;

/// Full listing behind one of the home screen rows ("see all").
#[derive(Debug)]
pub struct ProductListScreen {
    repository: Repository,
    scope: ScreenScope,
    facet: ProductFacet,
    products: Slot<Vec<Product>>,
    running: Option<AbortHandle>,
}

impl ProductListScreen {
    /// Create the screen and load the first page.
    #[must_use]
    pub fn new(repository: Repository, facet: ProductFacet) -> Self {
        let mut screen = Self {
            repository,
            scope: ScreenScope::new(),
            facet,
            products: Slot::loading(),
            running: None,
        };
        screen.load(1, LISTING_PAGE_SIZE);
        screen
    }

    pub fn load(&mut self, page: u32, per_page: u32) {
        let stream = self.repository.products(self.facet, page, per_page);
        self.scope
            .relaunch(&mut self.running, stream, &self.products);
    }

    #[must_use]
    pub const fn facet(&self) -> ProductFacet {
        self.facet
    }

    #[must_use]
    pub const fn products(&self) -> &Slot<Vec<Product>> {
        &self.products
    }

    pub async fn destroy(self) {
        self.scope.destroy().await;
    }
}
