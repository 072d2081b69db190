use crate::ports::outbound::{AccessToken, AccessTokenProvider};
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

/// Tokens closer than this to expiry are refreshed before use
pub const DEFAULT_SAFETY_MARGIN_SECS: i64 = 60;

/// CachingTokenProvider wraps an AccessTokenProvider and reuses its token
/// until it is about to expire.
///
/// The lock is held across the refresh, so concurrent callers that find the
/// cache stale wait for a single exchange instead of each starting their own.
/// A failed refresh leaves the previous (stale) entry in place and is
/// reported to every caller that was waiting on it in turn.
pub struct CachingTokenProvider<P: AccessTokenProvider> {
    inner: P,
    cached: Mutex<Option<AccessToken>>,
    safety_margin: Duration,
}

impl<P: AccessTokenProvider> CachingTokenProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_safety_margin(inner, Duration::seconds(DEFAULT_SAFETY_MARGIN_SECS))
    }

    pub fn with_safety_margin(inner: P, safety_margin: Duration) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
            safety_margin,
        }
    }
}

#[async_trait]
impl<P: AccessTokenProvider> AccessTokenProvider for CachingTokenProvider<P> {
    async fn get_token(&self) -> Result<AccessToken> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_usable(Utc::now(), self.safety_margin) {
                return Ok(token.clone());
            }
        }

        let fresh = self.inner.get_token().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}
