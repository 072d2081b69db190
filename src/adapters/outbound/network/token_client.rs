use crate::ports::outbound::{AccessToken, AccessTokenProvider};
use crate::shared::{AuditError, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// ClientCredentialsTokenClient adapter performing the OAuth2
/// client-credentials exchange against the directory's token endpoint.
///
/// Every call performs a fresh exchange; wrap it in
/// [`CachingTokenProvider`](super::CachingTokenProvider) to reuse tokens.
pub struct ClientCredentialsTokenClient {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
}

impl ClientCredentialsTokenClient {
    pub fn new(
        client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
        scope: String,
    ) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
            scope,
        }
    }

    /// `{authority}/{tenant}/oauth2/v2.0/token`
    pub fn token_url(authority_host: &str, tenant_id: &str) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            authority_host.trim_end_matches('/'),
            urlencoding::encode(tenant_id)
        )
    }

    async fn exchange(&self) -> Result<AccessToken> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AuditError::auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AuditError::auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            ))
            .into());
        }

        let payload: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuditError::auth(format!("invalid token response: {}", e)))?;

        if payload.access_token.is_empty() {
            return Err(AuditError::auth("missing access_token in token response").into());
        }

        let expires_in = payload.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS).max(1);
        let expires_at = Utc::now() + Duration::seconds(expires_in);

        tracing::debug!(scope = %self.scope, expires_in, "acquired access token");

        Ok(AccessToken::new(payload.access_token, expires_at))
    }
}

#[async_trait]
impl AccessTokenProvider for ClientCredentialsTokenClient {
    async fn get_token(&self) -> Result<AccessToken> {
        self.exchange().await
    }
}
