//! Product search.

use woostore_core::CategoryId;
use woostore_storefront::repository::Repository;
use woostore_storefront::screens::SearchScreen;

use super::{CommandError, require};

pub async fn search(repository: Repository, query: &str) -> Result<(), CommandError> {
    let mut screen = SearchScreen::new(repository);
    screen.search(query);

    let result = require("results", screen.results()).await.map(|_| ());
    screen.destroy().await;
    result
}

/// Ranked search. Uses the plain sort request unless a price bound or
/// category narrows the results.
pub async fn filter(
    repository: Repository,
    query: &str,
    sort: &str,
    higher_price: &str,
    lower_price: &str,
    category: Option<i64>,
) -> Result<(), CommandError> {
    let mut screen = SearchScreen::new(repository);
    let narrowed = !higher_price.is_empty() || !lower_price.is_empty() || category.is_some();

    let slot = if narrowed {
        screen.sort_and_filter(
            query,
            sort,
            higher_price,
            lower_price,
            category.map(CategoryId::new),
        )
    } else {
        screen.sort(query, sort)
    };

    let result = require("results", &slot).await.map(|_| ());
    screen.destroy().await;
    result
}
