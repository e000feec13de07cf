//! CLI error type.

use bookstore_admin::AdminError;
use bookstore_client::{ApiError, ConfigError};
use bookstore_core::storage::StorageError;
use bookstore_storefront::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Lookup by ID found nothing.
    #[error("{0} not found")]
    NotFound(String),

    /// Argument combination clap cannot express.
    #[error("Invalid input: {0}")]
    Input(String),
}

impl CliError {
    /// Text for the person at the terminal.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Service(e) => e.user_message(),
            Self::Admin(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
