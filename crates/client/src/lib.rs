//! Bookstore Client - HTTP transport for the backend API.
//!
//! # Architecture
//!
//! - One HTTP request per service call, via [`ApiClient`]
//! - Responses are unwrapped from the `{code, message, result}` envelope
//! - Non-success statuses become [`ApiError::Api`] carrying the server message
//! - [`ViewScope`] ties in-flight requests to the lifetime of a view
//!
//! # Example
//!
//! ```rust,ignore
//! use bookstore_client::{ApiClient, ApiConfig};
//!
//! let client = ApiClient::new(&ApiConfig::from_env()?)?;
//! let categories: Vec<Category> = client.get_or_default("categories", &[]).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod scope;

pub use client::{ApiClient, Query};
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use scope::{ScopeHandle, ViewScope};
