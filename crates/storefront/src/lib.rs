//! Bookstore Storefront - customer-facing services.
//!
//! Every screen of the customer site maps onto a service reachable from
//! [`Storefront`]: sign-in and registration, the confirmation-email resend
//! screen, catalog browsing, the cart, checkout and order history, account
//! settings, reviews and vouchers.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookstore_storefront::Storefront;
//!
//! let storefront = Storefront::new(api, store, Arc::new(SystemClock));
//! let user = storefront.auth().login("a@b.com", "sachhay123").await?;
//! let page = storefront.catalog().list_products(PageRequest::default(), &Default::default()).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod services;
pub mod state;

pub use error::ServiceError;
pub use services::catalog::{ProductFilter, ProductView};
pub use services::orders::Checkout;
pub use services::resend::ResendView;
pub use state::Storefront;
