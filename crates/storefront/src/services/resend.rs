//! "Resend confirmation email" screen.
//!
//! The controller owns no state of its own: every call re-reads the throttle
//! record from client storage, so several screens for the same address stay
//! consistent.

use bookstore_core::Email;
use bookstore_core::throttle::ResendStatus;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::state::Storefront;

/// What the screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResendView {
    pub email: Email,
    pub status: ResendStatus,
    /// Whether the resend button is enabled.
    pub can_resend: bool,
    /// Why it is disabled, if it is.
    pub notice: Option<String>,
}

impl ResendView {
    /// `sent/limit`, e.g. `2/3`.
    #[must_use]
    pub fn counter(&self) -> String {
        self.status.to_string()
    }
}

pub struct ResendController {
    state: Storefront,
    email: Email,
}

impl ResendController {
    pub(crate) const fn new(state: Storefront, email: Email) -> Self {
        Self { state, email }
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Current counter, button state and notice.
    #[must_use]
    pub fn view(&self) -> ResendView {
        let decision = self.state.throttle().can_resend(&self.email);
        ResendView {
            email: self.email.clone(),
            status: self.state.throttle().status(&self.email),
            can_resend: decision.is_allowed(),
            notice: decision.reason(),
        }
    }

    /// Ask the backend to send the confirmation email again.
    ///
    /// The send is counted only once the backend accepts it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ResendRefused`] if the throttle blocks the send,
    /// or the backend's error.
    #[instrument(skip(self), fields(email = %self.email))]
    pub async fn resend(&self) -> Result<ResendView, ServiceError> {
        let decision = self.state.throttle().can_resend(&self.email);
        if !decision.is_allowed() {
            return Err(ServiceError::ResendRefused(decision));
        }

        self.state
            .api()
            .post_empty::<serde::de::IgnoredAny>(
                "auth/resend-confirmation",
                &[("email", self.email.to_string())],
            )
            .await?;

        let status = self.state.throttle().record_resend(&self.email)?;
        info!(sent = %status, "confirmation email resent");
        Ok(self.view())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bookstore_client::{ApiClient, ApiConfig};
    use bookstore_core::clock::ManualClock;
    use bookstore_core::storage::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn setup() -> (Arc<ManualClock>, Storefront) {
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 5, 23, 9, 0, 0).unwrap(),
        ));
        let sf = Storefront::new(api, Arc::new(MemoryStore::new()), clock.clone());
        (clock, sf)
    }

    #[test]
    fn test_view_after_registration() {
        let (_clock, sf) = setup();
        let email = Email::parse("a@b.com").unwrap();
        sf.throttle().note_registration(&email).unwrap();

        let view = sf.resend(email).view();
        assert_eq!(view.counter(), "1/3");
        assert!(view.can_resend);
        assert!(view.notice.is_none());
    }

    #[test]
    fn test_view_cools_down_after_a_send() {
        let (clock, sf) = setup();
        let email = Email::parse("a@b.com").unwrap();
        sf.throttle().note_registration(&email).unwrap();
        sf.throttle().record_resend(&email).unwrap();

        let controller = sf.resend(email);
        let view = controller.view();
        assert_eq!(view.counter(), "2/3");
        assert!(!view.can_resend);
        assert!(view.notice.unwrap().contains("60 giây"));

        clock.advance(Duration::seconds(60));
        assert!(controller.view().can_resend);
    }

    #[tokio::test]
    async fn test_refused_send_never_reaches_backend() {
        let (_clock, sf) = setup();
        let email = Email::parse("a@b.com").unwrap();
        sf.throttle().note_registration(&email).unwrap();
        sf.throttle().record_resend(&email).unwrap();

        let err = sf.resend(email.clone()).resend().await.unwrap_err();
        assert!(matches!(err, ServiceError::ResendRefused(_)));
        assert_eq!(sf.resend(email).view().counter(), "2/3");
    }
}
