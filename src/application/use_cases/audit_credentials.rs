use crate::application::dto::{AuditReport, AuditRequest};
use crate::credential_audit::domain::ApplicationView;
use crate::credential_audit::services::{Reconciler, ThresholdFilter};
use crate::ports::outbound::DirectoryRepository;
use crate::shared::Result;
use chrono::{DateTime, Utc};

/// AuditCredentialsUseCase - Core use case for the expiration audit
///
/// Lists both directory collections concurrently, merges them into one view
/// per application and keeps the credentials worth reporting.
///
/// # Type Parameters
/// * `D` - DirectoryRepository implementation
pub struct AuditCredentialsUseCase<D> {
    directory: D,
}

impl<D> AuditCredentialsUseCase<D>
where
    D: DirectoryRepository,
{
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Every reconciled application, regardless of expiration
    ///
    /// # Errors
    /// Fails if either listing fails; no partial view is returned
    pub async fn list_applications(&self, now: DateTime<Utc>) -> Result<Vec<ApplicationView>> {
        let (service_principals, applications) = futures::try_join!(
            self.directory.list_service_principals(),
            self.directory.list_applications()
        )?;

        tracing::debug!(
            service_principals = service_principals.len(),
            applications = applications.len(),
            "directory listings fetched"
        );

        Ok(Reconciler::reconcile(&service_principals, &applications, now))
    }

    /// Executes the audit: reconcile, then filter by the request's thresholds
    pub async fn execute(&self, request: AuditRequest) -> Result<AuditReport> {
        let views = self.list_applications(request.now).await?;
        let flagged = ThresholdFilter::filter(&views, &request.thresholds);

        tracing::info!(
            scanned = views.len(),
            flagged = flagged.len(),
            thresholds = %request.thresholds,
            "credential audit complete"
        );

        Ok(AuditReport {
            applications_scanned: views.len(),
            flagged,
        })
    }
}
