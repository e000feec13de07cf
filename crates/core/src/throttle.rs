//! Advisory throttle for "resend confirmation email".
//!
//! Each address gets [`DAILY_LIMIT`] sends per local calendar day, the
//! registration email included, with [`COOLDOWN_SECONDS`] between sends.
//! State lives in client storage under per-address keys, so clearing storage
//! or switching devices resets it: the backend must enforce its own limit.
//!
//! Day rollover works through two markers. `emailLastResendDate_<email>`
//! resets the counter to zero on a new day; `registration_<email>` records
//! the day on which the registration email was last counted, and the first
//! sync of a day bumps the counter once and stamps it. Net effect: every
//! day starts at 1. The guard only holds as long as both keys are written
//! together; a store that loses one of them re-counts or skips the
//! registration send.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::storage::{KeyValueStore, StorageError};
use crate::types::Email;

/// Sends allowed per address per day, registration email included.
pub const DAILY_LIMIT: u32 = 3;

/// Minimum gap between two sends.
pub const COOLDOWN_SECONDS: i64 = 60;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage keys, namespaced per address.
pub mod keys {
    use crate::types::Email;

    #[must_use]
    pub fn count(email: &Email) -> String {
        format!("emailResendCount_{email}")
    }

    #[must_use]
    pub fn last_date(email: &Email) -> String {
        format!("emailLastResendDate_{email}")
    }

    #[must_use]
    pub fn last_time(email: &Email) -> String {
        format!("emailLastResendTime_{email}")
    }

    #[must_use]
    pub fn registration(email: &Email) -> String {
        format!("registration_{email}")
    }
}

/// Outcome of [`ResendThrottle::can_resend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendDecision {
    Allowed,
    DailyLimitReached,
    CoolingDown { remaining_secs: u64 },
}

impl ResendDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Human-readable refusal reason.
    #[must_use]
    pub fn reason(self) -> Option<String> {
        match self {
            Self::Allowed => None,
            Self::DailyLimitReached => Some(format!(
                "Bạn đã đạt giới hạn {DAILY_LIMIT} lần gửi email trong ngày. Vui lòng thử lại vào ngày mai."
            )),
            Self::CoolingDown { remaining_secs } => Some(format!(
                "Vui lòng đợi {remaining_secs} giây trước khi gửi lại."
            )),
        }
    }

    #[must_use]
    pub const fn cooldown_remaining_secs(self) -> Option<u64> {
        match self {
            Self::CoolingDown { remaining_secs } => Some(remaining_secs),
            _ => None,
        }
    }
}

/// Snapshot for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResendStatus {
    pub sent_today: u32,
    pub daily_limit: u32,
    /// Zero when no cooldown is running.
    pub cooldown_remaining_secs: u64,
}

impl ResendStatus {
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.sent_today)
    }

    #[must_use]
    pub const fn limit_reached(&self) -> bool {
        self.sent_today >= self.daily_limit
    }

    #[must_use]
    pub const fn can_resend(&self) -> bool {
        !self.limit_reached() && self.cooldown_remaining_secs == 0
    }
}

/// Formats as `sent/limit`, e.g. `2/3`.
impl std::fmt::Display for ResendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.sent_today, self.daily_limit)
    }
}

/// Per-address resend bookkeeping over an injected store and clock.
#[derive(Clone)]
pub struct ResendThrottle {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ResendThrottle {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn today(&self) -> String {
        self.clock.today().format(DATE_FORMAT).to_string()
    }

    fn read_count(&self, email: &Email) -> u32 {
        let key = keys::count(email);
        match self.store.get(&key) {
            None => 0,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(key = %key, value = %raw, "corrupt resend counter, treating as 0");
                0
            }),
        }
    }

    fn read_last_time(&self, email: &Email) -> Option<i64> {
        let key = keys::last_time(email);
        let raw = self.store.get(&key)?;
        raw.trim().parse().map_or_else(
            |_| {
                warn!(key = %key, value = %raw, "corrupt resend timestamp, ignoring");
                None
            },
            Some,
        )
    }

    fn read_date(&self, key: &str) -> Option<NaiveDate> {
        let raw = self.store.get(key)?;
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_or_else(
            |_| {
                warn!(key = %key, value = %raw, "corrupt resend date, ignoring");
                None
            },
            Some,
        )
    }

    /// Apply the day rollover and return the current count.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the reset could not be persisted.
    pub fn sync_day(&self, email: &Email) -> Result<u32, StorageError> {
        let today = self.clock.today();
        let today_str = self.today();
        let mut count = self.read_count(email);

        if self.read_date(&keys::last_date(email)) != Some(today) {
            debug!(email = %email, "new day, resetting resend counter");
            count = 0;
            self.store.set(&keys::count(email), "0")?;
            self.store.set(&keys::last_date(email), &today_str)?;
        }

        if self.read_date(&keys::registration(email)) != Some(today) {
            count += 1;
            self.store.set(&keys::count(email), &count.to_string())?;
            self.store.set(&keys::registration(email), &today_str)?;
        }

        Ok(count)
    }

    /// Register that the sign-up flow just sent the first confirmation email.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the counter could not be persisted.
    pub fn note_registration(&self, email: &Email) -> Result<(), StorageError> {
        self.sync_day(email).map(|_| ())
    }

    fn cooldown_remaining(&self, email: &Email) -> u64 {
        let Some(last) = self.read_last_time(email) else {
            return 0;
        };
        let window_ms = COOLDOWN_SECONDS * 1000;
        let elapsed_ms = self.clock.now().timestamp_millis() - last;
        if elapsed_ms >= window_ms {
            return 0;
        }
        // A clock that went backwards still waits at most one full window.
        let remaining_ms = (window_ms - elapsed_ms).min(window_ms);
        u64::try_from((remaining_ms + 999) / 1000).unwrap_or(0)
    }

    fn synced_count(&self, email: &Email) -> u32 {
        self.sync_day(email).unwrap_or_else(|e| {
            warn!(email = %email, error = %e, "could not persist resend day rollover");
            self.read_count(email)
        })
    }

    /// Decide whether a resend may go out now.
    pub fn can_resend(&self, email: &Email) -> ResendDecision {
        let count = self.synced_count(email);
        if count >= DAILY_LIMIT {
            return ResendDecision::DailyLimitReached;
        }
        match self.cooldown_remaining(email) {
            0 => ResendDecision::Allowed,
            remaining_secs => ResendDecision::CoolingDown { remaining_secs },
        }
    }

    /// Count a send that just happened.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the new count could not be persisted.
    pub fn record_resend(&self, email: &Email) -> Result<ResendStatus, StorageError> {
        let count = self.sync_day(email)? + 1;
        let now_ms = self.clock.now().timestamp_millis();

        self.store.set(&keys::count(email), &count.to_string())?;
        self.store.set(&keys::last_time(email), &now_ms.to_string())?;
        self.store.set(&keys::last_date(email), &self.today())?;
        debug!(email = %email, count, "recorded confirmation resend");

        Ok(self.status(email))
    }

    /// Current counters for display.
    pub fn status(&self, email: &Email) -> ResendStatus {
        ResendStatus {
            sent_today: self.synced_count(email),
            daily_limit: DAILY_LIMIT,
            cooldown_remaining_secs: self.cooldown_remaining(email),
        }
    }
}
