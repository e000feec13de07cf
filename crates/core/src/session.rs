//! Access token and current-user persistence.
//!
//! The token is a JWT issued by the backend. The client never verifies its
//! signature (it has no key); it only reads the `exp` claim so an expired
//! token is dropped locally instead of producing a 401 on the next request.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::storage::{KeyValueStore, StorageError};
use crate::types::UserProfile;

/// Session keys in client storage.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const USER: &str = "user";
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying it.
///
/// Returns `None` for anything that is not a three-part token with a JSON
/// payload carrying a numeric `exp`.
#[must_use]
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

/// Whether `token` is past its `exp`. Tokens without a readable `exp` count
/// as expired.
#[must_use]
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    token_expiry(token).is_none_or(|exp| exp <= now)
}

/// The signed-in user's token and profile, kept in client storage.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl Session {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Persist a fresh login.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if either value could not be written.
    pub fn save(&self, token: &str, user: &UserProfile) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(user)?;
        self.store.set(keys::ACCESS_TOKEN, token)?;
        self.store.set(keys::USER, &user_json)?;
        debug!(user_id = %user.id, "session saved");
        Ok(())
    }

    /// Replace the stored profile (after an account update).
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the profile could not be written.
    pub fn update_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        self.store.set(keys::USER, &serde_json::to_string(user)?)
    }

    /// The stored token if it has not expired. An expired token is removed.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        let token = self.store.get(keys::ACCESS_TOKEN)?;
        if is_token_expired(&token, self.clock.now()) {
            debug!("stored access token expired, clearing session");
            if let Err(e) = self.clear() {
                warn!(error = %e, "could not clear expired session");
            }
            return None;
        }
        Some(token)
    }

    /// The stored profile, if present and decodable.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        let raw = self.store.get(keys::USER)?;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "stored user is not valid JSON"))
            .ok()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Forget the token and profile.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if either key could not be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(keys::ACCESS_TOKEN)?;
        self.store.remove(keys::USER)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;
    use crate::types::{UserId, UserRole};

    /// Build an unsigned token with the given claims.
    fn token(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS512"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{header}.{payload}.c2ln")
    }

    fn user() -> UserProfile {
        UserProfile {
            id: UserId::new(7),
            email: "a@b.com".to_owned(),
            full_name: "Trần Thị B".to_owned(),
            phone_number: None,
            address: None,
            date_of_birth: None,
            role: UserRole::User,
            active: true,
        }
    }

    fn setup() -> (Arc<ManualClock>, Session) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 5, 23, 9, 0, 0).unwrap(),
        ));
        let session = Session::new(Arc::new(MemoryStore::new()), clock.clone());
        (clock, session)
    }

    #[test]
    fn test_token_expiry_reads_exp() {
        let t = token(&json!({"sub": "a@b.com", "exp": 1_748_000_000}));
        assert_eq!(token_expiry(&t).unwrap().timestamp(), 1_748_000_000);
    }

    #[test]
    fn test_malformed_tokens_have_no_expiry() {
        assert!(token_expiry("not-a-jwt").is_none());
        assert!(token_expiry("a.b.c.d").is_none());
        assert!(token_expiry("a.!!!.c").is_none());
        assert!(token_expiry(&token(&json!({"sub": "x"}))).is_none());
        assert!(is_token_expired("not-a-jwt", Utc::now()));
    }

    #[test]
    fn test_session_roundtrip() {
        let (clock, session) = setup();
        let exp = clock.now() + Duration::hours(1);
        let t = token(&json!({"exp": exp.timestamp()}));

        session.save(&t, &user()).unwrap();
        assert_eq!(session.access_token().as_deref(), Some(t.as_str()));
        assert_eq!(session.current_user().unwrap(), user());
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_expired_token_clears_session() {
        let (clock, session) = setup();
        let exp = clock.now() + Duration::minutes(5);
        session.save(&token(&json!({"exp": exp.timestamp()})), &user()).unwrap();

        clock.advance(Duration::minutes(6));
        assert!(session.access_token().is_none());
        assert!(session.current_user().is_none());
    }
}
