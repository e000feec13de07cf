//! Profile and password management for the signed-in customer.

use bookstore_core::UserProfile;
use bookstore_core::validation::{PasswordChangeForm, ProfileForm};
use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::state::Storefront;

#[derive(Clone)]
pub struct AccountService {
    state: Storefront,
}

impl AccountService {
    pub(crate) const fn new(state: Storefront) -> Self {
        Self { state }
    }

    /// Fetch the profile from the backend and refresh the stored copy.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotAuthenticated`] without a session, or the
    /// backend's error.
    #[instrument(skip(self))]
    pub async fn my_info(&self) -> Result<UserProfile, ServiceError> {
        self.state.auth().require_user()?;
        let user: UserProfile = self.state.api().get("users/my-info", &[]).await?;
        self.state.session().update_user(&user)?;
        Ok(user)
    }

    /// Pre-filled edit form for the stored profile.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotAuthenticated`] without a session.
    pub fn profile_form(&self) -> Result<ProfileForm, ServiceError> {
        let user = self.state.auth().require_user()?;
        Ok(ProfileForm {
            full_name: user.full_name,
            phone_number: user.phone_number,
            address: user.address,
            date_of_birth: user.date_of_birth.map(|d| d.date()),
        })
    }

    /// # Errors
    ///
    /// Returns a validation error, [`ServiceError::NotAuthenticated`], or the
    /// backend's error.
    #[instrument(skip(self, form))]
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<UserProfile, ServiceError> {
        let user = self.state.auth().require_user()?;
        form.validate(self.state.clock().today())?;

        let updated: UserProfile = self
            .state
            .api()
            .put(&format!("users/{}", user.id), form)
            .await?;
        self.state.session().update_user(&updated)?;
        info!(user_id = %updated.id, "profile updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns a validation error, [`ServiceError::NotAuthenticated`], or the
    /// backend's error (e.g. wrong current password).
    #[instrument(skip(self, form))]
    pub async fn change_password(&self, form: &PasswordChangeForm) -> Result<(), ServiceError> {
        self.state.auth().require_user()?;
        form.validate()?;
        self.state
            .api()
            .post::<_, serde::de::IgnoredAny>("users/change-password", form)
            .await?;
        info!("password changed");
        Ok(())
    }
}
