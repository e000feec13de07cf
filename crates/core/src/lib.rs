//! Bookstore Core - Domain types and pure business logic.
//!
//! This crate is shared by every bookstore component:
//! - `client` - HTTP transport for the backend API
//! - `storefront` - Customer-facing services (catalog, cart, checkout, account)
//! - `admin` - Back-office services (products, orders, promotions, users, reviews)
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate performs no network I/O. Anything that touches the outside
//! world (client storage, wall-clock time) goes through the [`storage::KeyValueStore`]
//! and [`clock::Clock`] traits so it can be replaced by in-memory fakes.
//!
//! # Modules
//!
//! - [`types`] - IDs, money, emails, statuses and the backend's resource shapes
//! - [`dates`] - Normalization of the backend's date representations
//! - [`pricing`] - Order totals and status aggregation
//! - [`promotion`] - Discount/voucher values and derived validity status
//! - [`cart`] - Client-side shopping cart
//! - [`throttle`] - Advisory resend throttle for confirmation emails
//! - [`session`] - Access token and current-user persistence
//! - [`validation`] - Form validation
//! - [`pagination`] - Page requests and paged responses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod clock;
pub mod dates;
pub mod pagination;
pub mod pricing;
pub mod promotion;
pub mod session;
pub mod storage;
pub mod throttle;
pub mod types;
pub mod validation;

pub use types::*;
