//! Product reviews.

use bookstore_core::pagination::{Page, PageRequest};
use bookstore_core::validation::ReviewForm;
use bookstore_core::{ProductId, Review};
use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::state::Storefront;

#[derive(Clone)]
pub struct ReviewService {
    state: Storefront,
}

impl ReviewService {
    pub(crate) const fn new(state: Storefront) -> Self {
        Self { state }
    }

    #[instrument(skip(self))]
    pub async fn for_product(&self, product_id: ProductId, page: PageRequest) -> Page<Review> {
        self.state
            .api()
            .get_page(&format!("reviews/product/{product_id}"), &page.query())
            .await
    }

    /// # Errors
    ///
    /// Returns [`ServiceError::NotAuthenticated`], a validation error, or the
    /// backend's error.
    #[instrument(skip(self, form), fields(product_id = %form.product_id))]
    pub async fn submit(&self, form: &ReviewForm) -> Result<Review, ServiceError> {
        self.state.auth().require_user()?;
        form.validate()?;
        let review: Review = self.state.api().post("reviews", form).await?;
        info!(review_id = %review.id, "review submitted");
        Ok(review)
    }
}

/// Mean rating, rounded to one decimal place.
#[must_use]
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let count = u32::try_from(reviews.len()).ok()?;
    Some((f64::from(sum) / f64::from(count) * 10.0).round() / 10.0)
}
