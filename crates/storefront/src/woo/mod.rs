//! WooCommerce REST API transport.
//!
//! # Architecture
//!
//! - One shared `reqwest::Client` (connection pool) behind a cheaply
//!   cloneable [`WooClient`] handle
//! - The store is the source of truth: no local sync, no response cache,
//!   no retries. Timeout policy lives here and nowhere else
//! - JSON responses deserialize straight into `woostore_core` records
//!
//! # Example
//!
//! ```rust,ignore
//! use woostore_storefront::woo::{QueryParams, WooClient};
//!
//! let client = WooClient::new(&config.woo)?;
//!
//! let products: Vec<Product> = client
//!     .get("products", &QueryParams::new().page(1).per_page(20))
//!     .await?;
//! ```

mod client;
pub mod params;

pub use client::WooClient;
pub use params::QueryParams;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the store.
#[derive(Debug, Error)]
pub enum WooError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("API error {status} ({code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// WooCommerce error code (e.g. `woocommerce_rest_invalid_id`).
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the store.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl WooError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::Url(_) => None,
        }
    }

    /// Network-level failure (as opposed to a response the store chose to send).
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::RateLimited(_))
    }
}

/// Error body sent by WooCommerce with non-success statuses.
///
/// ```json
/// {"code": "woocommerce_rest_invalid_id", "message": "Invalid ID.", "data": {"status": 404}}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

/// Build a [`WooError`] from a non-success status and its raw body.
pub(crate) fn error_from_body(status: u16, body: &str) -> WooError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    if status == 404 {
        return WooError::NotFound(
            parsed.map_or_else(|| "resource not found".to_string(), |b| b.message),
        );
    }
    match parsed {
        Some(ApiErrorBody { code, message }) => WooError::Api {
            status,
            code,
            message,
        },
        None => WooError::Api {
            status,
            code: "unknown".to_string(),
            message: body.chars().take(200).collect(),
        },
    }
}
