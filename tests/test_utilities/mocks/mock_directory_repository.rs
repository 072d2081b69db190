use async_trait::async_trait;
use chrono::{DateTime, Utc};
use credwatch::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock DirectoryRepository serving fixed listings
pub struct MockDirectoryRepository {
    pub service_principals: Vec<ServicePrincipalRecord>,
    pub applications: Vec<ApplicationRecord>,
    pub fail_with_status: Option<u16>,
    pub calls: Arc<AtomicUsize>,
}

impl MockDirectoryRepository {
    pub fn new() -> Self {
        Self {
            service_principals: vec![],
            applications: vec![],
            fail_with_status: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_service_principal(mut self, entity: DirectoryEntity) -> Self {
        self.service_principals.push(entity);
        self
    }

    pub fn with_application(mut self, entity: DirectoryEntity) -> Self {
        self.applications.push(entity);
        self
    }

    pub fn with_failure(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::new()
        }
    }

    fn check(&self, collection: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with_status {
            Some(status) => Err(AuditError::Directory {
                status,
                url: format!("https://graph.example/v1.0/{}", collection),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl Default for MockDirectoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryRepository for MockDirectoryRepository {
    async fn list_service_principals(&self) -> Result<Vec<ServicePrincipalRecord>> {
        self.check("servicePrincipals")?;
        Ok(self.service_principals.clone())
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>> {
        self.check("applications")?;
        Ok(self.applications.clone())
    }
}

/// Directory entity with no credentials
pub fn entity(app_id: &str, name: &str) -> DirectoryEntity {
    DirectoryEntity {
        id: format!("obj-{}-{}", app_id, name),
        app_id: app_id.to_string(),
        display_name: Some(name.to_string()),
        password_credentials: vec![],
        key_credentials: vec![],
    }
}

pub fn secret(key_id: &str, expires: DateTime<Utc>) -> PasswordCredentialRecord {
    PasswordCredentialRecord {
        key_id: key_id.to_string(),
        display_name: None,
        end_date_time: Some(expires),
    }
}

pub fn certificate(key_id: &str, expires: DateTime<Utc>) -> KeyCredentialRecord {
    KeyCredentialRecord {
        key_id: key_id.to_string(),
        display_name: Some(format!("{} cert", key_id)),
        end_date_time: Some(expires),
        key_type: Some("AsymmetricX509Cert".to_string()),
        usage: Some("Verify".to_string()),
    }
}
