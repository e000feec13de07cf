//! Account shapes.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{UserId, UserRole};
use crate::dates;

/// The account record returned by `/users/my-info` and the admin user list.
///
/// Serialized as-is into client storage under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    /// Kept as a plain string: stored accounts predate current validation rules.
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, with = "dates::flexible")]
    pub date_of_birth: Option<NaiveDateTime>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl UserProfile {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Date of birth formatted for a date input.
    #[must_use]
    pub fn date_of_birth_input(&self) -> String {
        dates::format_date_input(self.date_of_birth)
    }
}
