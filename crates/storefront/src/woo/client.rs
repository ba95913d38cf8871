//! WooCommerce REST client implementation.
//!
//! Uses `reqwest` for HTTP and `url` to compose request URLs under the
//! versioned REST root. Every call is a single round-trip.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::params::QueryParams;
use super::{WooError, error_from_body};
use crate::config::{AuthMode, WooConfig};

/// Characters of a response body kept in error logs.
const LOGGED_BODY_CHARS: usize = 500;

// =============================================================================
// WooClient
// =============================================================================

/// Client for the WooCommerce REST API.
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Clone)]
pub struct WooClient {
    inner: Arc<WooClientInner>,
}

struct WooClientInner {
    client: reqwest::Client,
    base_url: Url,
    consumer_key: String,
    consumer_secret: SecretString,
    auth_mode: AuthMode,
}

impl std::fmt::Debug for WooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("auth_mode", &self.inner.auth_mode)
            .finish_non_exhaustive()
    }
}

impl WooClient {
    /// Create a new REST client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(config: &WooConfig) -> Result<Self, WooError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("woostore/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(WooClientInner {
                client,
                base_url: config.base_url.clone(),
                consumer_key: config.consumer_key.clone(),
                consumer_secret: config.consumer_secret.clone(),
                auth_mode: config.auth_mode,
            }),
        })
    }

    /// Versioned REST root all paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// `GET {path}?{query}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the store answers with a
    /// non-success status, or the body does not match `T`.
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<T, WooError> {
        let request = self.request(Method::GET, path, query)?;
        self.execute(request).await
    }

    /// `GET` a list and return its first element.
    ///
    /// Used for lookups by a unique key (`customers?email=`, `coupons?code=`)
    /// which the API exposes as filtered lists.
    ///
    /// # Errors
    ///
    /// Returns [`WooError::NotFound`] with `what` when the list is empty,
    /// otherwise the same errors as [`Self::get`].
    pub async fn get_first<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &QueryParams,
        what: &str,
    ) -> Result<T, WooError> {
        let items: Vec<T> = self.get(path, query).await?;
        items
            .into_iter()
            .next()
            .ok_or_else(|| WooError::NotFound(what.to_string()))
    }

    /// `POST {path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, WooError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, path, &QueryParams::new())?
            .json(body);
        self.execute(request).await
    }

    /// `PUT {path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, WooError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::PUT, path, &QueryParams::new())?
            .json(body);
        self.execute(request).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Resolve `path` under the REST root and append the query, plus
    /// credentials when they travel in the query string.
    fn url(&self, path: &str, query: &QueryParams) -> Result<Url, WooError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        let with_credentials = self.inner.auth_mode == AuthMode::QueryString;

        if !query.is_empty() || with_credentials {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.pairs() {
                pairs.append_pair(key, value);
            }
            if with_credentials {
                pairs
                    .append_pair("consumer_key", &self.inner.consumer_key)
                    .append_pair(
                        "consumer_secret",
                        self.inner.consumer_secret.expose_secret(),
                    );
            }
        }

        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &QueryParams,
    ) -> Result<RequestBuilder, WooError> {
        debug!(%method, path, query = ?query.pairs(), "Sending store request");

        let url = self.url(path, query)?;
        let builder = self.inner.client.request(method, url);

        Ok(match self.inner.auth_mode {
            AuthMode::Basic => builder.basic_auth(
                &self.inner.consumer_key,
                Some(self.inner.consumer_secret.expose_secret()),
            ),
            AuthMode::QueryString => builder,
        })
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, WooError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(WooError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text),
                "Store returned non-success status"
            );
            return Err(error_from_body(status.as_u16(), &response_text));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&response_text),
                "Failed to parse store response"
            );
            WooError::Parse(e)
        })
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOGGED_BODY_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(mode: AuthMode) -> WooClient {
        let mut config = WooConfig::new(
            "https://shop.example/wp-json/wc/v3",
            "ck_key",
            "cs_secret",
        )
        .unwrap();
        config.auth_mode = mode;
        WooClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_with_query_credentials() {
        let client = client(AuthMode::QueryString);
        let url = client
            .url("products", &QueryParams::new().page(2).per_page(20))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://shop.example/wp-json/wc/v3/products?page=2&per_page=20&consumer_key=ck_key&consumer_secret=cs_secret"
        );
    }

    #[test]
    fn test_url_with_basic_auth_has_no_credentials() {
        let client = client(AuthMode::Basic);
        let url = client.url("/orders/727", &QueryParams::new()).unwrap();
        assert_eq!(url.as_str(), "https://shop.example/wp-json/wc/v3/orders/727");
    }

    #[test]
    fn test_url_encodes_search_text() {
        let client = client(AuthMode::Basic);
        let url = client
            .url("products", &QueryParams::new().search("red shoe&co"))
            .unwrap();
        assert_eq!(url.query(), Some("search=red+shoe%26co"));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let debug = format!("{:?}", client(AuthMode::QueryString));
        assert!(debug.contains("shop.example"));
        assert!(!debug.contains("cs_secret"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(&"x".repeat(600)).len(), LOGGED_BODY_CHARS);
        assert_eq!(truncate("short"), "short");
    }
}
