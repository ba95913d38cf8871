//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WOO_BASE_URL` - Versioned REST root (e.g., `https://shop.example/wp-json/wc/v3/`)
//! - `WOO_CONSUMER_KEY` - REST API consumer key (`ck_...`)
//! - `WOO_CONSUMER_SECRET` - REST API consumer secret (`cs_...`, high entropy)
//!
//! ## Optional
//! - `WOO_AUTH_MODE` - `query` (default) or `basic`
//! - `WOO_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `WOO_PER_PAGE` - Page size for home screen rows (default: 20)
//! - `WOO_SPECIAL_OFFERS_PRODUCT_ID` - Product shown in the special offers slider
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;
use woostore_core::ProductId;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PER_PAGE: u32 = 20;
/// WooCommerce rejects `per_page` above this.
pub const MAX_PER_PAGE: u32 = 100;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// How REST credentials are presented to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `consumer_key` / `consumer_secret` query parameters.
    #[default]
    QueryString,
    /// HTTP Basic auth (HTTPS only).
    Basic,
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "query" | "querystring" => Ok(Self::QueryString),
            "basic" => Ok(Self::Basic),
            _ => Err(format!("expected 'query' or 'basic', got '{s}'")),
        }
    }
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// WooCommerce REST API configuration
    pub woo: WooConfig,
    /// Page size for home screen rows
    pub per_page: u32,
    /// Product shown in the special offers slider
    pub special_offers_product: Option<ProductId>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// WooCommerce REST API configuration.
///
/// Implements `Debug` manually to redact the consumer secret.
#[derive(Clone)]
pub struct WooConfig {
    /// Versioned REST root, always ending in `/`
    pub base_url: Url,
    /// REST consumer key
    pub consumer_key: String,
    /// REST consumer secret
    pub consumer_secret: SecretString,
    /// Credential presentation
    pub auth_mode: AuthMode,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for WooConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WooConfig")
            .field("base_url", &self.base_url.as_str())
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("auth_mode", &self.auth_mode)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the consumer secret fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let woo = WooConfig::from_env()?;
        let per_page = parse_env_or_default("WOO_PER_PAGE", DEFAULT_PER_PAGE)?;
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(ConfigError::InvalidEnvVar(
                "WOO_PER_PAGE".to_string(),
                format!("must be between 1 and {MAX_PER_PAGE}"),
            ));
        }
        let special_offers_product = get_optional_env("WOO_SPECIAL_OFFERS_PRODUCT_ID")
            .map(|raw| {
                raw.parse::<i64>().map(ProductId::new).map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "WOO_SPECIAL_OFFERS_PRODUCT_ID".to_string(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?;

        Ok(Self {
            woo,
            per_page,
            special_offers_product,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }
}

impl WooConfig {
    /// Build a configuration from explicit values (tests, embedding).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not a URL.
    pub fn new(
        base_url: &str,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            consumer_key: consumer_key.into(),
            consumer_secret: SecretString::from(consumer_secret.into()),
            auth_mode: AuthMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(&get_required_env("WOO_BASE_URL")?)?;
        let auth_mode = get_optional_env("WOO_AUTH_MODE")
            .map(|raw| {
                raw.parse::<AuthMode>()
                    .map_err(|e| ConfigError::InvalidEnvVar("WOO_AUTH_MODE".to_string(), e))
            })
            .transpose()?
            .unwrap_or_default();
        if auth_mode == AuthMode::Basic && base_url.scheme() != "https" {
            return Err(ConfigError::InvalidEnvVar(
                "WOO_AUTH_MODE".to_string(),
                "basic auth requires an https WOO_BASE_URL".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            consumer_key: get_required_env("WOO_CONSUMER_KEY")?,
            consumer_secret: get_validated_secret("WOO_CONSUMER_SECRET")?,
            auth_mode,
            timeout: Duration::from_secs(parse_env_or_default(
                "WOO_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the base URL and make sure it ends in `/` so relative resource
/// paths join under it instead of replacing its last segment.
fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar("WOO_BASE_URL".to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "WOO_BASE_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Generate a new key pair in WooCommerce > Settings > Advanced > REST API."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("cs_your-secret-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("cs_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result =
            validate_secret_strength("cs_3f9b1c27d8e04a6b95f2c1e7a0d4b8c6f1e2a3d9", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = normalize_base_url("https://shop.example/wp-json/wc/v3").unwrap();
        assert_eq!(url.as_str(), "https://shop.example/wp-json/wc/v3/");
        assert_eq!(
            url.join("products").unwrap().as_str(),
            "https://shop.example/wp-json/wc/v3/products"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(normalize_base_url("not a url").is_err());
        assert!(normalize_base_url("mailto:shop@example.com").is_err());
    }

    #[test]
    fn test_auth_mode_parse() {
        assert_eq!("query".parse::<AuthMode>().unwrap(), AuthMode::QueryString);
        assert_eq!("BASIC".parse::<AuthMode>().unwrap(), AuthMode::Basic);
        assert!("oauth".parse::<AuthMode>().is_err());
    }

    #[test]
    fn test_woo_config_debug_redacts_secret() {
        let config = WooConfig::new(
            "https://shop.example/wp-json/wc/v3/",
            "ck_public_value",
            "cs_super_secret_value",
        )
        .unwrap();

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("shop.example"));
        assert!(debug_output.contains("ck_public_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("cs_super_secret_value"));
    }
}
