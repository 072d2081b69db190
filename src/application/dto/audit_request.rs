use crate::credential_audit::domain::ThresholdSet;
use chrono::{DateTime, Utc};

/// AuditRequest - Internal request DTO for the credential audit use case
#[derive(Debug, Clone)]
pub struct AuditRequest {
    /// Day counts at which a credential is reported
    pub thresholds: ThresholdSet,
    /// Reference instant for day counts
    pub now: DateTime<Utc>,
}

impl AuditRequest {
    pub fn new(thresholds: ThresholdSet) -> Self {
        Self {
            thresholds,
            now: Utc::now(),
        }
    }

    /// Evaluates expirations against a fixed instant instead of the clock
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}
