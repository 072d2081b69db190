use super::credential::CredentialDescriptor;
use serde::Serialize;

/// One application with every secret and certificate found for it across
/// both directory collections.
///
/// Built fresh by the reconciler on each run. `app_id` (the client id) is the
/// identity; `id` is the object id of whichever record was seen first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    id: String,
    app_id: String,
    display_name: String,
    secrets: Vec<CredentialDescriptor>,
    certificates: Vec<CredentialDescriptor>,
}

impl ApplicationView {
    pub fn new(id: String, app_id: String, display_name: String) -> Self {
        Self {
            id,
            app_id,
            display_name,
            secrets: Vec::new(),
            certificates: Vec::new(),
        }
    }

    pub fn add_secret(&mut self, secret: CredentialDescriptor) {
        self.secrets.push(secret);
    }

    pub fn add_certificate(&mut self, certificate: CredentialDescriptor) {
        self.certificates.push(certificate);
    }

    /// Copy of this view keeping only the credentials accepted by `keep`.
    pub fn retain_credentials<F>(&self, keep: F) -> Self
    where
        F: Fn(&CredentialDescriptor) -> bool,
    {
        Self {
            id: self.id.clone(),
            app_id: self.app_id.clone(),
            display_name: self.display_name.clone(),
            secrets: self.secrets.iter().filter(|c| keep(c)).cloned().collect(),
            certificates: self
                .certificates
                .iter()
                .filter(|c| keep(c))
                .cloned()
                .collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn secrets(&self) -> &[CredentialDescriptor] {
        &self.secrets
    }

    pub fn certificates(&self) -> &[CredentialDescriptor] {
        &self.certificates
    }

    /// Secrets first, then certificates
    pub fn credentials(&self) -> impl Iterator<Item = &CredentialDescriptor> {
        self.secrets.iter().chain(self.certificates.iter())
    }

    pub fn credential_count(&self) -> usize {
        self.secrets.len() + self.certificates.len()
    }

    pub fn has_credentials(&self) -> bool {
        self.credential_count() > 0
    }
}
