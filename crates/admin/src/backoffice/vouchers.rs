//! Voucher management. Same rules as discounts, plus a required code.

use bookstore_core::VoucherId;
use bookstore_core::promotion::{Promotion, Voucher};
use bookstore_core::validation::PromotionForm;
use tracing::{info, instrument};

use super::{AdminClient, Listed};
use crate::error::AdminError;

impl AdminClient {
    #[instrument(skip(self))]
    pub async fn list_vouchers(&self) -> Vec<Listed<Voucher>> {
        let now = self.clock().local_now();
        let vouchers: Vec<Voucher> = self.api().get_or_default("vouchers", &[]).await;
        vouchers
            .into_iter()
            .map(|v| Listed {
                status: v.status_at(now),
                item: v,
            })
            .collect()
    }

    #[instrument(skip(self), fields(voucher_id = %id))]
    pub async fn voucher(&self, id: VoucherId) -> Option<Voucher> {
        self.api().get_optional(&format!("vouchers/{id}")).await
    }

    /// # Errors
    ///
    /// Returns a validation error or the backend's error (e.g. duplicate code).
    #[instrument(skip(self, form), fields(code = ?form.code))]
    pub async fn create_voucher(&self, form: &PromotionForm) -> Result<Voucher, AdminError> {
        self.require_admin()?;
        form.validate(true)?;
        let voucher: Voucher = self.api().post("vouchers", form).await?;
        info!(code = %voucher.code, "voucher created");
        Ok(voucher)
    }

    /// # Errors
    ///
    /// Returns a validation error or the backend's error.
    #[instrument(skip(self, form), fields(voucher_id = %id))]
    pub async fn update_voucher(
        &self,
        id: VoucherId,
        form: &PromotionForm,
    ) -> Result<Voucher, AdminError> {
        self.require_admin()?;
        form.validate(true)?;
        let voucher: Voucher = self.api().put(&format!("vouchers/{id}"), form).await?;
        info!("voucher updated");
        Ok(voucher)
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(voucher_id = %id))]
    pub async fn delete_voucher(&self, id: VoucherId) -> Result<(), AdminError> {
        self.require_admin()?;
        self.api().delete(&format!("vouchers/{id}")).await?;
        info!("voucher deleted");
        Ok(())
    }
}
