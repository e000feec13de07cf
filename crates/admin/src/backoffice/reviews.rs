//! Review moderation.

use bookstore_core::pagination::{Page, PageRequest};
use bookstore_core::{Review, ReviewId};
use tracing::{info, instrument};

use super::AdminClient;
use crate::error::AdminError;

impl AdminClient {
    #[instrument(skip(self))]
    pub async fn list_reviews(&self, page: PageRequest) -> Page<Review> {
        self.api().get_page("reviews", &page.query()).await
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn delete_review(&self, id: ReviewId) -> Result<(), AdminError> {
        self.require_admin()?;
        self.api().delete(&format!("reviews/{id}")).await?;
        info!("review deleted");
        Ok(())
    }
}
