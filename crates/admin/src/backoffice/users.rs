//! User management.

use bookstore_core::pagination::{Page, PageRequest};
use bookstore_core::{UserId, UserProfile, UserRole};
use serde::Serialize;
use tracing::{info, instrument};

use super::AdminClient;
use crate::error::AdminError;

/// Fields an administrator may change on an account. `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UserUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.role.is_none() && self.active.is_none()
    }
}

impl AdminClient {
    #[instrument(skip(self))]
    pub async fn list_users(&self, page: PageRequest) -> Page<UserProfile> {
        self.api().get_page("users", &page.query()).await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn user(&self, id: UserId) -> Option<UserProfile> {
        self.api().get_optional(&format!("users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns a validation error for an empty update or a blank name, or
    /// the backend's error.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<UserProfile, AdminError> {
        self.require_admin()?;
        let mut errors = bookstore_core::validation::ValidationErrors::new();
        if update.is_empty() {
            errors.add("update", "nothing to update");
        }
        if update.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            errors.add("full_name", "full name is required");
        }
        errors.into_result(())?;

        let user: UserProfile = self.api().put(&format!("users/{id}"), update).await?;
        info!("user updated");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns [`AdminError::SelfDelete`] for the signed-in account, or the
    /// backend's error.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), AdminError> {
        let me = self.require_admin()?;
        if me.id == id {
            return Err(AdminError::SelfDelete);
        }
        self.api().delete(&format!("users/{id}")).await?;
        info!("user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = UserUpdate {
            active: Some(false),
            ..UserUpdate::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"active":false}"#
        );
        assert!(UserUpdate::default().is_empty());
    }
}
