use crate::credential_audit::domain::{ApplicationRecord, ServicePrincipalRecord};
use crate::shared::Result;
use async_trait::async_trait;

/// DirectoryRepository port for reading credential-bearing directory objects
///
/// Both listings return the complete collection or fail; a listing that
/// breaks halfway never yields the pages already fetched.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Lists every service principal with its secrets and certificates
    ///
    /// # Errors
    /// Returns an error if:
    /// - A bearer token cannot be obtained (`AuditError::Auth`)
    /// - Any page request returns a non-success status (`AuditError::Directory`)
    /// - A page cannot be parsed
    async fn list_service_principals(&self) -> Result<Vec<ServicePrincipalRecord>>;

    /// Lists every app registration with its secrets and certificates
    ///
    /// # Errors
    /// Same failure modes as [`DirectoryRepository::list_service_principals`]
    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>>;
}
