use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One-time sign-in token bound to an email address.
///
/// `expires_at` is a unix timestamp in seconds. The token is usable only
/// strictly before that instant.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MagicLinkToken {
    pub token: String,
    pub email: String,
    pub expires_at: i64,
}

impl MagicLinkToken {
    pub fn new(token: impl Into<String>, email: impl Into<String>, expires_at: i64) -> Self {
        Self {
            token: token.into(),
            email: email.into(),
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}
