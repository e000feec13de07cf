//! Storefront service errors.

use bookstore_client::ApiError;
use bookstore_core::storage::StorageError;
use bookstore_core::throttle::ResendDecision;
use bookstore_core::validation::ValidationErrors;
use bookstore_core::{OrderStatus, PromotionStatus};
use thiserror::Error;

/// Errors returned by storefront services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input failed client-side validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Client storage could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The operation needs a signed-in user.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Checkout with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Product does not exist or is out of stock.
    #[error("Product unavailable: {0}")]
    ProductUnavailable(String),

    /// Customers may only cancel pending orders.
    #[error("Order cannot be cancelled in status {0}")]
    NotCancellable(OrderStatus),

    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    /// Voucher exists but is not currently valid.
    #[error("Voucher {code} is {status}")]
    VoucherUnavailable {
        code: String,
        status: PromotionStatus,
    },

    /// Resend throttle refused the send.
    #[error("Resend refused: {0:?}")]
    ResendRefused(ResendDecision),
}

impl ServiceError {
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
            Self::EmptyCart => "Giỏ hàng của bạn đang trống.".to_string(),
            Self::ProductUnavailable(name) => format!("Sản phẩm {name} hiện không còn hàng."),
            Self::NotCancellable(status) => {
                format!("Không thể hủy đơn hàng ở trạng thái \"{}\".", status.label())
            }
            Self::VoucherNotFound(code) => format!("Mã giảm giá {code} không tồn tại."),
            Self::VoucherUnavailable { code, status } => {
                format!("Mã giảm giá {code}: {}.", status.label())
            }
            Self::ResendRefused(decision) => decision
                .reason()
                .unwrap_or_else(|| "Không thể gửi lại email lúc này.".to_string()),
        }
    }
}
