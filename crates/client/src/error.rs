//! Transport errors.

use thiserror::Error;

/// Shown when the server gives no usable message.
pub const FALLBACK_MESSAGE: &str = "Đã có lỗi xảy ra. Vui lòng thử lại sau.";

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        /// Application error code from the envelope, if any.
        code: Option<i64>,
        message: String,
    },

    /// The body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The owning view went away before the response arrived.
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status of an [`ApiError::Api`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Message suitable for showing to a person.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Http(e) if e.is_timeout() => {
                "Máy chủ phản hồi quá lâu. Vui lòng thử lại.".to_string()
            }
            Self::Http(_) => "Không thể kết nối tới máy chủ.".to_string(),
            Self::Decode(_) | Self::InvalidUrl(_) => FALLBACK_MESSAGE.to_string(),
            Self::Cancelled => "Yêu cầu đã bị hủy.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_helpers() {
        let err = ApiError::Api {
            status: 404,
            code: Some(1005),
            message: "Không tìm thấy sản phẩm".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_unauthorized());
        assert_eq!(err.user_message(), "Không tìm thấy sản phẩm");
        assert_eq!(ApiError::Cancelled.status(), None);
    }

    #[test]
    fn test_display() {
        let err = ApiError::Api {
            status: 400,
            code: None,
            message: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 400 - bad");
        assert_eq!(ApiError::InvalidUrl("x".into()).user_message(), FALLBACK_MESSAGE);
    }
}
