//! Screen state holders.
//!
//! Each screen owns a [`Repository`](crate::repository::Repository) handle,
//! a [`ScreenScope`] for its in-flight requests and one [`Slot`] per query
//! it shows. Rendering code observes the slots; it never calls the
//! repository itself.
//!
//! # Lifecycle
//!
//! Screens start their initial queries when constructed, so they must be
//! created inside a Tokio runtime. `destroy().await` cancels everything
//! still in flight; no slot changes after it returns.
//!
//! When a query is re-invoked (a new search, a refresh) the previous
//! request for the same slot is aborted, so the slot always reflects the
//! latest invocation.

mod account;
mod cart;
mod category;
mod detail;
mod home;
mod product_list;
mod scope;
mod search;
mod slot;

pub use account::AccountScreen;
pub use cart::CartScreen;
pub use category::CategoryScreen;
pub use detail::DetailScreen;
pub use home::HomeScreen;
pub use product_list::ProductListScreen;
pub use scope::ScreenScope;
pub use search::SearchScreen;
pub use slot::Slot;

/// Page size for full listings, search results and category pages.
pub const LISTING_PAGE_SIZE: u32 = crate::config::MAX_PER_PAGE;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fixtures {
    use woostore_core::{Category, Product};

    pub fn product(id: i64, name: &str, price: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "price": price,
            "categories": [{"id": 1, "name": "Shoes"}],
        }))
        .unwrap()
    }

    pub fn category(id: i64, name: &str) -> Category {
        serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap()
    }
}
