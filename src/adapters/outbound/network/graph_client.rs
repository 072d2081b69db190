use crate::credential_audit::domain::{ApplicationRecord, DirectoryEntity, ServicePrincipalRecord};
use crate::ports::outbound::{AccessTokenProvider, DirectoryRepository};
use crate::shared::{AuditError, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Fields requested for every directory object
const SELECT_FIELDS: &str = "id,appId,displayName,passwordCredentials,keyCredentials";

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    value: Vec<DirectoryEntity>,
    #[serde(rename = "@odata.nextLink", default)]
    next_link: Option<String>,
}

/// GraphDirectoryClient adapter listing service principals and app
/// registrations from the directory REST API.
///
/// Pages are followed through `@odata.nextLink` until it is absent. A token
/// is requested per page, so a long listing survives a token refresh.
pub struct GraphDirectoryClient<T: AccessTokenProvider> {
    client: reqwest::Client,
    base_url: String,
    tokens: T,
}

impl<T: AccessTokenProvider> GraphDirectoryClient<T> {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, tokens: T) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/{}?$select={}",
            self.base_url,
            collection,
            urlencoding::encode(SELECT_FIELDS)
        )
    }

    async fn fetch_page(&self, url: &str) -> Result<Page> {
        let token = self.tokens.get_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&token.value)
            .send()
            .await
            .map_err(|e| directory_error(e, 0, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Directory {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        response
            .json::<Page>()
            .await
            .map_err(|e| directory_error(e, status.as_u16(), url))
    }

    /// Collects every page of `collection`; any failing page fails the whole listing
    async fn list_all(&self, collection: &str) -> Result<Vec<DirectoryEntity>> {
        let mut records = Vec::new();
        let mut next = Some(self.collection_url(collection));
        let mut pages = 0usize;

        while let Some(url) = next {
            let page = self.fetch_page(&url).await?;
            pages += 1;
            records.extend(page.value);
            next = page.next_link;
        }

        tracing::debug!(collection, pages, records = records.len(), "directory listing complete");
        Ok(records)
    }
}

/// Wraps a transport or decode failure so callers still see `AuditError::Directory`
fn directory_error(source: reqwest::Error, status: u16, url: &str) -> anyhow::Error {
    anyhow::Error::new(source).context(AuditError::Directory {
        status,
        url: url.to_string(),
    })
}

#[async_trait]
impl<T: AccessTokenProvider> DirectoryRepository for GraphDirectoryClient<T> {
    async fn list_service_principals(&self) -> Result<Vec<ServicePrincipalRecord>> {
        self.list_all("servicePrincipals").await
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>> {
        self.list_all("applications").await
    }
}
