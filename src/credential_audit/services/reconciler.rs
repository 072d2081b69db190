use crate::credential_audit::domain::{
    ApplicationRecord, ApplicationView, CredentialDescriptor, CredentialSource, DirectoryEntity,
    ServicePrincipalRecord,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Reconciler - merges service principals and app registrations into one
/// view per application id.
///
/// The same application usually appears in both collections under the same
/// `appId` (but different object ids), so the merge key is the `appId`.
/// Service principals are processed first: when both collections carry an
/// application, the view's object id and display name come from the service
/// principal. Views are returned in first-insertion order.
pub struct Reconciler;

impl Reconciler {
    pub fn reconcile(
        service_principals: &[ServicePrincipalRecord],
        applications: &[ApplicationRecord],
        now: DateTime<Utc>,
    ) -> Vec<ApplicationView> {
        let mut merged = OrderedViews::default();

        for record in service_principals {
            merged.absorb(record, CredentialSource::ServicePrincipal, now);
        }
        for record in applications {
            merged.absorb(record, CredentialSource::Application, now);
        }

        merged.into_views()
    }
}

/// Insertion-ordered map from app id to view
#[derive(Default)]
struct OrderedViews {
    index: HashMap<String, usize>,
    views: Vec<ApplicationView>,
}

impl OrderedViews {
    fn absorb(&mut self, record: &DirectoryEntity, source: CredentialSource, now: DateTime<Utc>) {
        let position = match self.index.get(&record.app_id) {
            Some(&position) => position,
            None => {
                let display_name = record
                    .display_name
                    .clone()
                    .unwrap_or_else(|| record.app_id.clone());
                self.views.push(ApplicationView::new(
                    record.id.clone(),
                    record.app_id.clone(),
                    display_name,
                ));
                let position = self.views.len() - 1;
                self.index.insert(record.app_id.clone(), position);
                position
            }
        };
        let view = &mut self.views[position];

        for secret in &record.password_credentials {
            let Some(expires_at) = secret.end_date_time else {
                tracing::debug!(
                    app_id = %record.app_id,
                    key_id = %secret.key_id,
                    "skipping secret without an expiration"
                );
                continue;
            };
            view.add_secret(CredentialDescriptor::secret(
                secret.key_id.clone(),
                secret.display_name.clone(),
                expires_at,
                source,
                now,
            ));
        }

        for certificate in &record.key_credentials {
            let Some(expires_at) = certificate.end_date_time else {
                tracing::debug!(
                    app_id = %record.app_id,
                    key_id = %certificate.key_id,
                    "skipping certificate without an expiration"
                );
                continue;
            };
            view.add_certificate(CredentialDescriptor::certificate(
                certificate.key_id.clone(),
                certificate.display_name.clone(),
                expires_at,
                source,
                certificate.key_type.clone(),
                certificate.usage.clone(),
                now,
            ));
        }
    }

    fn into_views(self) -> Vec<ApplicationView> {
        self.views
    }
}
