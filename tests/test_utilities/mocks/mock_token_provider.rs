use async_trait::async_trait;
use chrono::{Duration, Utc};
use credwatch::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock AccessTokenProvider handing out numbered tokens
#[derive(Clone)]
pub struct MockTokenProvider {
    pub lifetime: Duration,
    pub issued: Arc<AtomicUsize>,
    pub should_fail: bool,
}

impl MockTokenProvider {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            issued: Arc::new(AtomicUsize::new(0)),
            should_fail: false,
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::new(Duration::hours(1))
        }
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccessTokenProvider for MockTokenProvider {
    async fn get_token(&self) -> Result<AccessToken> {
        if self.should_fail {
            return Err(AuditError::auth("invalid_client").into());
        }
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AccessToken {
            value: format!("token-{}", n),
            expires_at: Utc::now() + self.lifetime,
        })
    }
}
