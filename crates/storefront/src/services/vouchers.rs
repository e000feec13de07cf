//! Voucher listing and lookup by code.

use bookstore_client::ApiError;
use bookstore_core::PromotionStatus;
use bookstore_core::promotion::{Promotion, Voucher};
use tracing::instrument;

use crate::error::ServiceError;
use crate::state::Storefront;

#[derive(Clone)]
pub struct VoucherService {
    state: Storefront,
}

impl VoucherService {
    pub(crate) const fn new(state: Storefront) -> Self {
        Self { state }
    }

    /// Vouchers usable right now. Fails open to an empty list.
    #[instrument(skip(self))]
    pub async fn available(&self) -> Vec<Voucher> {
        let now = self.state.clock().local_now();
        let vouchers: Vec<Voucher> = self.state.api().get_or_default("vouchers", &[]).await;
        vouchers
            .into_iter()
            .filter(|v| v.status_at(now) == PromotionStatus::Active)
            .collect()
    }

    /// Find an active voucher by its code.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::VoucherNotFound`] for an unknown code and
    /// [`ServiceError::VoucherUnavailable`] for one outside its validity window.
    #[instrument(skip(self))]
    pub async fn lookup(&self, code: &str) -> Result<Voucher, ServiceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ServiceError::VoucherNotFound(String::new()));
        }

        let voucher: Option<Voucher> = match self
            .state
            .api()
            .get_segments(&["vouchers", "code", code], &[])
            .await
        {
            Ok(voucher) => voucher,
            // `.` and `..` cannot name a voucher.
            Err(e) if e.is_not_found() || matches!(e, ApiError::InvalidUrl(_)) => None,
            Err(e) => return Err(e.into()),
        };
        let voucher = voucher.ok_or_else(|| ServiceError::VoucherNotFound(code.to_string()))?;

        match voucher.status_at(self.state.clock().local_now()) {
            PromotionStatus::Active => Ok(voucher),
            status => Err(ServiceError::VoucherUnavailable {
                code: voucher.code,
                status,
            }),
        }
    }
}
