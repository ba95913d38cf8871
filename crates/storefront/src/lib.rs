//! woostore storefront data layer.
//!
//! Layers, bottom up:
//! - [`woo`] - REST transport to a WooCommerce store
//! - [`source`] - one async method per store query ([`source::DataSource`])
//! - [`repository`] - each call as a `Loading -> Success | Error` stream
//! - [`screens`] - per-screen state holders with cancellable in-flight work
//!
//! [`config`] loads everything from the environment.
//!
//! ```rust,ignore
//! let config = StoreConfig::from_env()?;
//! let source = Arc::new(RemoteDataSource::from_config(&config)?);
//! let home = HomeScreen::new(Repository::shared(source), config.per_page);
//! let latest = home.latest().settled().await;
//! home.destroy().await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod repository;
pub mod screens;
pub mod source;
pub mod woo;
