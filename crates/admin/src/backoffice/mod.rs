//! Back-office client.
//!
//! [`AdminClient`] wraps the shared [`ApiClient`] with an administrator
//! session. Operations are split by resource, one `impl AdminClient` block
//! per module. Every write is validated client-side before it is sent; list
//! reads fail open to an empty page.

use std::sync::Arc;

use bookstore_client::ApiClient;
use bookstore_core::UserProfile;
use bookstore_core::clock::Clock;
use bookstore_core::session::Session;
use bookstore_core::storage::KeyValueStore;
use bookstore_core::validation::LoginForm;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::AdminError;

mod dashboard;
mod discounts;
mod orders;
mod products;
mod reviews;
mod users;
mod vouchers;

pub use dashboard::Dashboard;
pub use orders::{EditorLine, OrderEditor};
pub use products::ProductQuery;
pub use users::UserUpdate;

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// A promotion together with its status at listing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listed<T> {
    #[serde(flatten)]
    pub item: T,
    pub status: bookstore_core::PromotionStatus,
}

/// Back-office client.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    api: ApiClient,
    session: Session,
    clock: Arc<dyn Clock>,
}

impl AdminClient {
    /// Create a client. A stored administrator session is re-attached.
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let session = Session::new(store, clock.clone());
        if let Some(token) = session.access_token() {
            api.set_token(SecretString::from(token));
        }
        Self {
            inner: Arc::new(AdminClientInner {
                api,
                session,
                clock,
            }),
        }
    }

    pub(crate) fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    /// Sign in; only administrators are let through.
    ///
    /// # Errors
    ///
    /// Returns a validation error, [`AdminError::NotAdmin`] for a customer
    /// account, or the backend's error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AdminError> {
        let form = LoginForm {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        form.validate()?;

        let api = self.api();
        let response: LoginResponse = api.post("auth/login", &form).await?;
        api.set_token(SecretString::from(response.token.clone()));

        let user: UserProfile = match api.get("users/my-info", &[]).await {
            Ok(user) => user,
            Err(e) => {
                api.clear_token();
                return Err(e.into());
            }
        };
        if !user.is_admin() {
            warn!(user_id = %user.id, "non-admin account tried to sign in to the back office");
            api.clear_token();
            return Err(AdminError::NotAdmin);
        }

        self.inner.session.save(&response.token, &user)?;
        info!(user_id = %user.id, "administrator signed in");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns a storage error if the session could not be removed.
    pub fn logout(&self) -> Result<(), AdminError> {
        self.api().clear_token();
        self.inner.session.clear()?;
        Ok(())
    }

    /// The signed-in administrator.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthenticated`] without a valid session and
    /// [`AdminError::NotAdmin`] for a customer session.
    pub fn require_admin(&self) -> Result<UserProfile, AdminError> {
        let user = self
            .inner
            .session
            .access_token()
            .and_then(|_| self.inner.session.current_user())
            .ok_or(AdminError::NotAuthenticated)?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(AdminError::NotAdmin)
        }
    }
}
