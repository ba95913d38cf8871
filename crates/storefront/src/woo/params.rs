//! Query string composition for REST list endpoints.
//!
//! Rules shared by every list call:
//! - `page` is 1-based, `per_page` is the page size
//! - values are sent exactly as given, without trimming or clamping
//! - empty strings mean "unset" and are never sent (an empty price bound
//!   is unbounded)
//! - a category id of `0` means "no category filter" and is never sent
//! - sort keys are forwarded verbatim as `orderby`

use woostore_core::CategoryId;

/// Ordered list of query pairs for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Add a pair unless the value is empty.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.pairs.retain(|(k, _)| *k != key);
            self.pairs.push((key, value));
        }
        self
    }

    /// 1-based page number.
    #[must_use]
    pub fn page(self, page: u32) -> Self {
        self.with("page", page.to_string())
    }

    #[must_use]
    pub fn per_page(self, per_page: u32) -> Self {
        self.with("per_page", per_page.to_string())
    }

    #[must_use]
    pub fn search(self, query: &str) -> Self {
        self.with("search", query)
    }

    /// Sort key, forwarded verbatim.
    #[must_use]
    pub fn order_by(self, key: &str) -> Self {
        self.with("orderby", key)
    }

    /// `asc` or `desc`.
    #[must_use]
    pub fn order(self, direction: &str) -> Self {
        self.with("order", direction)
    }

    /// Category filter; `None` and id `0` mean no filter.
    #[must_use]
    pub fn category(self, category: Option<CategoryId>) -> Self {
        match category {
            Some(id) if id.as_i64() != 0 => self.with("category", id.to_string()),
            _ => self,
        }
    }

    /// Lower price bound; empty means unbounded.
    #[must_use]
    pub fn min_price(self, bound: &str) -> Self {
        self.with("min_price", bound)
    }

    /// Upper price bound; empty means unbounded.
    #[must_use]
    pub fn max_price(self, bound: &str) -> Self {
        self.with("max_price", bound)
    }

    #[must_use]
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Value sent for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
