//! Core types for woostore.
//!
//! This module provides type-safe wrappers and records for the storefront
//! domain.

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod customer;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod review;

pub use cart::{CartItem, CartLine, cart_lines};
pub use catalog::{Category, CategoryImage, CategoryRef, Product, ProductImage, StockStatus};
pub use coupon::{Coupon, DiscountType};
pub use customer::{Billing, Customer, CustomerPatch, NewCustomer, Shipping};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{CouponLine, LineItem, NewLineItem, NewOrder, Order, OrderStatus};
pub use price::{Price, PriceError};
pub use review::{NewReview, Review};
