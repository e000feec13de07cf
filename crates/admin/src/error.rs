//! Back-office errors.

use bookstore_client::ApiError;
use bookstore_core::OrderStatus;
use bookstore_core::storage::StorageError;
use bookstore_core::validation::ValidationErrors;
use thiserror::Error;

/// Errors returned by back-office operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input failed client-side validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Client storage could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not signed in")]
    NotAuthenticated,

    /// Signed in, but not as an administrator.
    #[error("Administrator role required")]
    NotAdmin,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Status change the order lifecycle does not allow.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// An administrator tried to delete their own account.
    #[error("Cannot delete the signed-in account")]
    SelfDelete,
}

impl AdminError {
    /// Message suitable for showing to a person.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::Validation(errors) => errors
                .iter()
                .next()
                .map_or_else(|| "Dữ liệu không hợp lệ.".to_string(), |(_, m)| m.to_string()),
            Self::Storage(_) => "Không thể lưu dữ liệu trên thiết bị.".to_string(),
            Self::NotAuthenticated => "Vui lòng đăng nhập để tiếp tục.".to_string(),
            Self::NotAdmin => "Tài khoản không có quyền quản trị.".to_string(),
            Self::NotFound(what) => format!("Không tìm thấy {what}."),
            Self::InvalidTransition { from, to } => format!(
                "Không thể chuyển đơn hàng từ \"{}\" sang \"{}\".",
                from.label(),
                to.label()
            ),
            Self::SelfDelete => "Không thể xóa tài khoản đang đăng nhập.".to_string(),
        }
    }
}
