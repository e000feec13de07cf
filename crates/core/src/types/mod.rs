//! Core types for the bookstore.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! resource shapes returned by the backend API.

pub mod catalog;
pub mod email;
pub mod id;
pub mod money;
pub mod order;
pub mod status;
pub mod user;

pub use catalog::{Category, Product, Review};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Money;
pub use order::{AppliedVoucher, Order, OrderLine, ShippingInfo};
pub use status::*;
pub use user::UserProfile;
