//! Catalog browsing: home rows, full listings and categories.

use woostore_core::CategoryId;
use woostore_storefront::repository::Repository;
use woostore_storefront::screens::{
    CategoryScreen, HomeScreen, LISTING_PAGE_SIZE, ProductListScreen,
};
use woostore_storefront::source::ProductFacet;

use super::{CommandError, report, require};

/// Print the four home screen slots. Only a failed `latest` row fails the
/// command; the other rows are reported either way.
pub async fn home(repository: Repository, per_page: u32) -> Result<(), CommandError> {
    let screen = HomeScreen::new(repository, per_page);

    let result = async {
        report("special_offers", screen.special_offers()).await?;
        report("best", screen.best()).await?;
        report("favourite", screen.favourite()).await?;
        require("latest", screen.latest()).await.map(|_| ())
    }
    .await;

    screen.destroy().await;
    result
}

pub async fn products(
    repository: Repository,
    facet: ProductFacet,
    page: u32,
    per_page: u32,
) -> Result<(), CommandError> {
    let mut screen = ProductListScreen::new(repository, facet);
    if (page, per_page) != (1, LISTING_PAGE_SIZE) {
        screen.load(page, per_page);
    }

    let result = require("products", screen.products()).await.map(|_| ());
    screen.destroy().await;
    result
}

pub async fn categories(repository: Repository) -> Result<(), CommandError> {
    let screen = CategoryScreen::new(repository);
    let result = require("categories", screen.categories()).await.map(|_| ());
    screen.destroy().await;
    result
}

pub async fn category(repository: Repository, id: i64, page: u32) -> Result<(), CommandError> {
    let mut screen = CategoryScreen::new(repository);
    screen.open_category(CategoryId::new(id), page);

    let result = require("products", screen.products()).await.map(|_| ());
    screen.destroy().await;
    result
}
