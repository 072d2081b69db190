use crate::credential_audit::domain::{ApplicationView, ThresholdSet};
use crate::shared::Result;
use async_trait::async_trait;
use serde::Serialize;

/// What happened to a triggered check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RunOutcome {
    /// The pipeline ran to completion
    #[serde(rename_all = "camelCase")]
    Completed {
        applications_scanned: usize,
        applications_flagged: usize,
        notified: bool,
    },
    /// Another run was already in progress; this trigger was dropped
    Skipped,
    /// The run failed; the error has already been logged
    Failed { error: String },
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Result of a successful service self-test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReport {
    pub applications_visible: usize,
    pub delivery_backend: String,
}

/// CredentialAuditPort - Inbound port driven by the HTTP front-end and the CLI
#[async_trait]
pub trait CredentialAuditPort: Send + Sync {
    /// Every reconciled application, regardless of expiration
    async fn list_applications(&self) -> Result<Vec<ApplicationView>>;

    /// Applications with at least one credential matching `thresholds`
    async fn list_expiring(&self, thresholds: &ThresholdSet) -> Result<Vec<ApplicationView>>;

    /// Runs the full check-and-notify pipeline now.
    ///
    /// Never fails: errors are logged and reported as [`RunOutcome::Failed`].
    async fn run_immediate_check(&self) -> RunOutcome;

    /// Verifies directory access and the mail backend
    ///
    /// # Errors
    /// Propagates token and directory failures, and reports an unreachable
    /// mail backend as `AuditError::Delivery`
    async fn test_services(&self) -> Result<ServiceReport>;
}
