use tokio::task::AbortHandle;
use woostore_core::{Category, CategoryId, Product};

use super::{LISTING_PAGE_SIZE, ScreenScope, Slot};
use crate::repository::Repository;

/// Category browser: the category list, then the products of the
/// category the shopper opens.
#[derive(Debug)]
pub struct CategoryScreen {
    repository: Repository,
    scope: ScreenScope,
    categories: Slot<Vec<Category>>,
    products: Slot<Vec<Product>>,
    open: Option<CategoryId>,
    running: Option<AbortHandle>,
}

impl CategoryScreen {
    /// Create the screen and load the first page of categories.
    #[must_use]
    pub fn new(repository: Repository) -> Self {
        let mut scope = ScreenScope::new();
        let categories = Slot::loading();
        scope.launch(repository.categories(1, LISTING_PAGE_SIZE), &categories);

        Self {
            repository,
            scope,
            categories,
            products: Slot::absent(),
            open: None,
            running: None,
        }
    }

    /// Show the products of `category_id`, replacing any open category.
    pub fn open_category(&mut self, category_id: CategoryId, page: u32) {
        self.open = Some(category_id);
        let stream = self
            .repository
            .products_in_category(page, LISTING_PAGE_SIZE, category_id);
        self.scope
            .relaunch(&mut self.running, stream, &self.products);
    }

    /// The category whose products are shown, if any.
    #[must_use]
    pub const fn open(&self) -> Option<CategoryId> {
        self.open
    }

    #[must_use]
    pub const fn categories(&self) -> &Slot<Vec<Category>> {
        &self.categories
    }

    #[must_use]
    pub const fn products(&self) -> &Slot<Vec<Product>> {
        &self.products
    }

    pub async fn destroy(self) {
        self.scope.destroy().await;
    }
}
