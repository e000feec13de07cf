//! Bookstore Admin - back-office services.
//!
//! CRUD for products, orders, discounts, vouchers, users and reviews, plus
//! the order editor and dashboard, all through [`AdminClient`].
//!
//! # Security
//!
//! Sign-in is refused for accounts without the `ADMIN` role, and every write
//! checks the stored session first. The backend enforces the same rules;
//! these checks only spare a round trip.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backoffice;
pub mod error;

pub use backoffice::{AdminClient, Dashboard, EditorLine, Listed, OrderEditor, ProductQuery, UserUpdate};
pub use error::AdminError;
