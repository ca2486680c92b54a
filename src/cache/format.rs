//! Cached token record format.
//!
//! On disk the record is a small JSON object:
//!
//! ```json
//! {"token": "abc123", "expires_at": 1736942400.0}
//! ```
//!
//! `expires_at` is an absolute instant in epoch seconds (float). A record
//! is always created as `acquired_at + validity`, so the expiry never has
//! to be guessed later.

use crate::clock::Clock;
use crate::WorkbenchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The single persisted credential: an access token and when it expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Opaque access token sent as `X-SecureSuite-Token`.
    pub token: String,

    /// Absolute expiry instant.
    #[serde(with = "epoch_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Create a record for a token acquired now, valid for `validity`.
    ///
    /// The expiry saturates at the latest representable instant;
    /// [`WorkbenchConfig::validate`](crate::WorkbenchConfig::validate) keeps
    /// configured windows far below that.
    pub fn issue(token: String, validity: Duration, clock: &dyn Clock) -> Self {
        let expires_at = chrono::Duration::from_std(validity)
            .ok()
            .and_then(|validity| clock.now_utc().checked_add_signed(validity))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { token, expires_at }
    }

    /// Local expiry check: `now <= expires_at - margin`.
    ///
    /// A margin too large to represent never counts as fresh.
    pub fn is_locally_fresh(&self, margin: Duration, clock: &dyn Clock) -> bool {
        chrono::Duration::from_std(margin)
            .ok()
            .and_then(|margin| self.expires_at.checked_sub_signed(margin))
            .is_some_and(|deadline| clock.now_utc() <= deadline)
    }

    /// Seconds left before the record expires (negative once expired).
    pub fn remaining_secs(&self, clock: &dyn Clock) -> i64 {
        self.expires_at
            .signed_duration_since(clock.now_utc())
            .num_seconds()
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, WorkbenchError> {
        serde_json::to_string(self)
            .map_err(|e| WorkbenchError::CacheIO(format!("Failed to serialize token: {}", e)))
    }

    /// Deserialize a record from JSON.
    pub fn from_json(json: &str) -> Result<Self, WorkbenchError> {
        serde_json::from_str(json)
            .map_err(|e| WorkbenchError::CacheIO(format!("Failed to deserialize token: {}", e)))
    }
}

/// Short, log-safe prefix of a token.
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    if prefix.len() < token.len() {
        format!("{}...", prefix)
    } else {
        prefix
    }
}

/// `DateTime<Utc>` as fractional epoch seconds.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let secs = value.timestamp() as f64 + f64::from(value.timestamp_subsec_micros()) / 1e6;
        serializer.serialize_f64(secs)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() {
            return Err(D::Error::custom("expires_at is not a finite number"));
        }
        let whole = secs.floor();
        let micros = ((secs - whole) * 1e6).round() as i64;
        DateTime::<Utc>::from_timestamp(whole as i64, 0)
            .map(|dt| dt + chrono::Duration::microseconds(micros))
            .ok_or_else(|| D::Error::custom(format!("expires_at out of range: {}", secs)))
    }
}
