use crate::adapters::outbound::mail::{
    CloudEmailAuth, CloudEmailBackend, RequestSigner, SmtpBackend, COMMUNICATION_SCOPE,
};
use crate::adapters::outbound::network::{CachingTokenProvider, ClientCredentialsTokenClient};
use crate::config::{DirectoryConfig, EmailPollConfig, MailProvider};
use crate::ports::outbound::DeliveryBackend;
use crate::shared::Result;
use std::sync::Arc;

/// Factory for creating the configured delivery backend
///
/// Exactly one backend is built; the rest of the application only sees the
/// `DeliveryBackend` port.
pub struct DeliveryBackendFactory;

impl DeliveryBackendFactory {
    /// Creates the backend selected by `provider`
    ///
    /// A cloud email resource without an access key authenticates with a
    /// token issued to the directory app registration.
    ///
    /// # Errors
    /// Returns `AuditError::Config` when the SMTP host or access key is unusable
    pub fn create(
        provider: &MailProvider,
        directory: &DirectoryConfig,
        poll: EmailPollConfig,
        client: reqwest::Client,
    ) -> Result<Box<dyn DeliveryBackend>> {
        match provider {
            MailProvider::Smtp(smtp) => Ok(Box::new(SmtpBackend::new(smtp)?)),
            MailProvider::CloudEmail(cloud) => {
                let auth = match &cloud.access_key {
                    Some(key) => CloudEmailAuth::AccessKey(RequestSigner::from_base64_key(key)?),
                    None => {
                        let tokens = ClientCredentialsTokenClient::new(
                            client.clone(),
                            ClientCredentialsTokenClient::token_url(
                                &directory.authority_host,
                                &directory.tenant_id,
                            ),
                            directory.client_id.clone(),
                            directory.client_secret.clone(),
                            COMMUNICATION_SCOPE.to_string(),
                        );
                        CloudEmailAuth::Bearer(Arc::new(CachingTokenProvider::new(tokens)))
                    }
                };
                Ok(Box::new(CloudEmailBackend::new(
                    client,
                    cloud.endpoint.clone(),
                    auth,
                    poll,
                )))
            }
        }
    }
}
