//! woostore core - domain types for the storefront data layer.
//!
//! This crate provides the records exchanged with the commerce backend and
//! consumed by the storefront screens:
//! - `storefront` - transport client, data source, repository and screens
//! - `cli` - command-line driver for the screens
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no runtime. Every record deserializes directly from the
//! WooCommerce REST JSON shape.
//!
//! # Modules
//!
//! - [`types`] - ids, prices, emails, catalog, customers, orders, reviews,
//!   coupons and the cart projection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
