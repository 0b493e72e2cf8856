//! Defines the session token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::auth::UserID;

/// A session for a logged in user that is valid until `expires_at`.
///
/// The token is stored as JSON in the encrypted auth cookie, with the expiry
/// written as an RFC 3339 timestamp, e.g. `{"user_id":1,"expires_at":"2025-12-21T00:00:00Z"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Token {
    /// The user the session belongs to.
    pub user_id: UserID,
    /// When the session ends.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// Start a session for `user_id` at `now` that lasts for `duration`.
    ///
    /// Returns `None` if the expiry does not fit in an [OffsetDateTime].
    pub fn issue(user_id: UserID, now: OffsetDateTime, duration: Duration) -> Option<Self> {
        now.checked_add(duration).map(|expires_at| Self {
            user_id,
            expires_at,
        })
    }

    /// Whether the session has ended at `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
