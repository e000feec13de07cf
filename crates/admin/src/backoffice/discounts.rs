//! Discount management.

use bookstore_core::DiscountId;
use bookstore_core::promotion::{Discount, Promotion};
use bookstore_core::validation::PromotionForm;
use tracing::{info, instrument};

use super::{AdminClient, Listed};
use crate::error::AdminError;

impl AdminClient {
    /// All discounts with their current status. Fails open to an empty list.
    #[instrument(skip(self))]
    pub async fn list_discounts(&self) -> Vec<Listed<Discount>> {
        let now = self.clock().local_now();
        let discounts: Vec<Discount> = self.api().get_or_default("discounts", &[]).await;
        discounts
            .into_iter()
            .map(|d| Listed {
                status: d.status_at(now),
                item: d,
            })
            .collect()
    }

    #[instrument(skip(self), fields(discount_id = %id))]
    pub async fn discount(&self, id: DiscountId) -> Option<Discount> {
        self.api().get_optional(&format!("discounts/{id}")).await
    }

    /// # Errors
    ///
    /// Returns a validation error (missing name, both or neither value,
    /// end before start) or the backend's error.
    #[instrument(skip(self, form), fields(name = %form.discount_name))]
    pub async fn create_discount(&self, form: &PromotionForm) -> Result<Discount, AdminError> {
        self.require_admin()?;
        form.validate(false)?;
        let discount: Discount = self.api().post("discounts", form).await?;
        info!("discount created");
        Ok(discount)
    }

    /// # Errors
    ///
    /// Returns a validation error or the backend's error.
    #[instrument(skip(self, form), fields(discount_id = %id))]
    pub async fn update_discount(
        &self,
        id: DiscountId,
        form: &PromotionForm,
    ) -> Result<Discount, AdminError> {
        self.require_admin()?;
        form.validate(false)?;
        let discount: Discount = self.api().put(&format!("discounts/{id}"), form).await?;
        info!("discount updated");
        Ok(discount)
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(discount_id = %id))]
    pub async fn delete_discount(&self, id: DiscountId) -> Result<(), AdminError> {
        self.require_admin()?;
        self.api().delete(&format!("discounts/{id}")).await?;
        info!("discount deleted");
        Ok(())
    }
}
