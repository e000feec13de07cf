//! Customer-facing services.
//!
//! # Services
//!
//! - `auth` - Login, logout, registration and session restore
//! - `resend` - Confirmation-email resend screen with client-side throttling
//! - `catalog` - Products, categories and sale prices (cached for 5 minutes)
//! - `cart` - Cart edits backed by client storage
//! - `orders` - Checkout, order history and customer cancellation
//! - `account` - Profile and password management
//! - `reviews` - Product reviews
//! - `vouchers` - Voucher listing and lookup by code

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod resend;
pub mod reviews;
pub mod vouchers;
