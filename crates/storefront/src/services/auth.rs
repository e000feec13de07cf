//! Login, logout, registration and session restore.

use bookstore_core::UserProfile;
use bookstore_core::validation::{LoginForm, RegistrationForm};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::ServiceError;
use crate::state::Storefront;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct LogoutRequest<'a> {
    token: &'a str,
}

/// Authentication against the backend plus local session bookkeeping.
#[derive(Clone)]
pub struct AuthService {
    state: Storefront,
}

impl AuthService {
    pub(crate) const fn new(state: Storefront) -> Self {
        Self { state }
    }

    /// Sign in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, or the backend's
    /// error if the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ServiceError> {
        let form = LoginForm {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let email = form.validate()?;

        let response: LoginResponse = self.state.api().post("auth/login", &form).await?;
        let api = self.state.api();
        api.set_token(SecretString::from(response.token.clone()));

        let user: UserProfile = match api.get("users/my-info", &[]).await {
            Ok(user) => user,
            Err(e) => {
                api.clear_token();
                return Err(e.into());
            }
        };

        self.state.session().save(&response.token, &user)?;
        info!(user_id = %user.id, email = %email, "signed in");
        Ok(user)
    }

    /// Sign out. The local session is cleared even if the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session could not be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ServiceError> {
        if let Some(token) = self.state.session().access_token()
            && let Err(e) = self
                .state
                .api()
                .post::<_, serde::de::IgnoredAny>("auth/logout", &LogoutRequest { token: &token })
                .await
        {
            warn!(error = %e, "backend logout failed, clearing local session anyway");
        }
        self.state.api().clear_token();
        self.state.session().clear()?;
        info!("signed out");
        Ok(())
    }

    /// Create an account. The backend sends the confirmation email, which
    /// counts as the first send of the day for the resend throttle.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input, or the backend's
    /// error (e.g. email already registered).
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<UserProfile, ServiceError> {
        let email = form.validate()?;
        let user: UserProfile = self.state.api().post("users", form).await?;
        if let Err(e) = self.state.throttle().note_registration(&email) {
            warn!(error = %e, "registered but resend counter could not be stored");
        }
        info!(user_id = %user.id, "registered");
        Ok(user)
    }

    /// Re-attach a stored, unexpired token. An expired one is cleared.
    #[must_use]
    pub fn restore(&self) -> Option<UserProfile> {
        let api = self.state.api();
        if let Some(token) = self.state.session().access_token() {
            api.set_token(SecretString::from(token));
            self.state.session().current_user()
        } else {
            api.clear_token();
            None
        }
    }

    /// The signed-in user, if the session is still valid.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.state
            .session()
            .access_token()
            .and_then(|_| self.state.session().current_user())
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotAuthenticated`] without a valid session.
    pub fn require_user(&self) -> Result<UserProfile, ServiceError> {
        self.current_user().ok_or(ServiceError::NotAuthenticated)
    }
}
