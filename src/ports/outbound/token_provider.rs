use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

/// Bearer credential for the directory (or mail) API.
///
/// Replaced as a whole on refresh, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: String, expires_at: DateTime<Utc>) -> Self {
        Self { value, expires_at }
    }

    /// True while `now` is more than `margin` before expiry
    pub fn is_usable(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now < self.expires_at - margin
    }
}

/// AccessTokenProvider port for obtaining bearer tokens
///
/// Implementations must be `Send + Sync`: one provider is shared by the
/// concurrent directory listings of a run.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a token valid for at least the provider's safety margin
    ///
    /// # Errors
    /// Returns `AuditError::Auth` if the token exchange fails or the
    /// response cannot be understood
    async fn get_token(&self) -> Result<AccessToken>;
}
