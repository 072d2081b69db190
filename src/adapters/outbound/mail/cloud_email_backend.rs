use super::request_signer::{RequestSigner, CONTENT_HASH_HEADER, DATE_HEADER};
use crate::config::EmailPollConfig;
use crate::ports::outbound::{AccessTokenProvider, DeliveryBackend, EmailMessage};
use crate::shared::{AuditError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const API_VERSION: &str = "2023-03-31";

/// Token scope for bearer access to the communication service
pub const COMMUNICATION_SCOPE: &str = "https://communication.azure.com/.default";

/// How requests to the email service are authenticated
pub enum CloudEmailAuth {
    AccessKey(RequestSigner),
    Bearer(Arc<dyn AccessTokenProvider>),
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl OperationError {
    fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message.clone(),
            (Some(code), None) => code.clone(),
            (None, None) => "no error details".to_string(),
        }
    }
}

enum PollState {
    Pending,
    Succeeded,
    Failed(String),
}

impl OperationStatus {
    fn state(&self) -> PollState {
        match self.status.as_deref() {
            Some("Succeeded") => PollState::Succeeded,
            Some(status @ ("Failed" | "Canceled")) => PollState::Failed(
                self.error
                    .as_ref()
                    .map(OperationError::describe)
                    .unwrap_or_else(|| status.to_string()),
            ),
            _ => PollState::Pending,
        }
    }
}

/// CloudEmailBackend adapter for the asynchronous email REST API.
///
/// `send` submits the message, then polls the returned operation until it
/// succeeds, fails, or the poll timeout elapses. The caller is blocked for
/// the whole exchange.
pub struct CloudEmailBackend {
    client: reqwest::Client,
    endpoint: String,
    auth: CloudEmailAuth,
    poll: EmailPollConfig,
}

impl CloudEmailBackend {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        auth: CloudEmailAuth,
        poll: EmailPollConfig,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            auth,
            poll,
        }
    }

    fn send_url(&self) -> Result<Url> {
        let raw = format!("{}/emails:send?api-version={}", self.endpoint, API_VERSION);
        Url::parse(&raw)
            .map_err(|e| AuditError::delivery(format!("invalid email endpoint {}: {}", raw, e)).into())
    }

    fn operation_url(&self, operation_id: &str) -> Result<Url> {
        let raw = format!(
            "{}/emails/operations/{}?api-version={}",
            self.endpoint,
            urlencoding::encode(operation_id),
            API_VERSION
        );
        Url::parse(&raw)
            .map_err(|e| AuditError::delivery(format!("invalid operation url {}: {}", raw, e)).into())
    }

    async fn authorize(
        &self,
        request: RequestBuilder,
        method: &str,
        url: &Url,
        body: &[u8],
    ) -> Result<RequestBuilder> {
        match &self.auth {
            CloudEmailAuth::AccessKey(signer) => {
                let signed = signer.sign(method, url, body, Utc::now())?;
                Ok(request
                    .header(DATE_HEADER, signed.date)
                    .header(CONTENT_HASH_HEADER, signed.content_hash)
                    .header(AUTHORIZATION, signed.authorization))
            }
            CloudEmailAuth::Bearer(tokens) => {
                let token = tokens.get_token().await?;
                Ok(request.bearer_auth(token.value))
            }
        }
    }

    fn request_body(message: &EmailMessage) -> Result<Vec<u8>> {
        let recipients: Vec<serde_json::Value> = message
            .to
            .iter()
            .map(|address| serde_json::json!({ "address": address }))
            .collect();
        let payload = serde_json::json!({
            "senderAddress": message.from,
            "content": {
                "subject": message.subject,
                "plainText": message.text_body,
                "html": message.html_body,
            },
            "recipients": { "to": recipients },
        });
        Ok(serde_json::to_vec(&payload)?)
    }

    /// Submits the message and returns the operation's poll url
    async fn submit(&self, message: &EmailMessage) -> Result<(Url, Option<OperationStatus>)> {
        let url = self.send_url()?;
        let body = Self::request_body(message)?;

        let request = self
            .authorize(self.client.post(url.clone()), "POST", &url, &body)
            .await?
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let response = request
            .send()
            .await
            .map_err(|e| AuditError::delivery(format!("email send request failed: {}", e)))?;

        let status = response.status();
        let operation_location = response
            .headers()
            .get("operation-location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AuditError::delivery(format!(
                "email service rejected the message with status {}: {}",
                status.as_u16(),
                text
            ))
            .into());
        }

        let initial: Option<OperationStatus> = serde_json::from_str(&text).ok();

        let poll_url = match operation_location {
            Some(location) => Url::parse(&location).map_err(|e| {
                AuditError::delivery(format!("invalid Operation-Location {}: {}", location, e))
            })?,
            None => {
                let id = initial.as_ref().and_then(|s| s.id.clone()).ok_or_else(|| {
                    AuditError::delivery("email service returned neither an operation location nor an id")
                })?;
                self.operation_url(&id)?
            }
        };

        Ok((poll_url, initial))
    }

    async fn poll_until_terminal(&self, url: &Url) -> Result<()> {
        let mut wait = self.poll.interval;

        loop {
            tokio::time::sleep(wait).await;

            let request = self
                .authorize(self.client.get(url.clone()), "GET", url, b"")
                .await?;
            let response = request
                .send()
                .await
                .map_err(|e| AuditError::delivery(format!("email status request failed: {}", e)))?;

            let status = response.status();
            wait = retry_after(response.headers()).unwrap_or(self.poll.interval);

            if !status.is_success() {
                return Err(AuditError::delivery(format!(
                    "email status request returned {}: {}",
                    status.as_u16(),
                    url
                ))
                .into());
            }

            let operation: OperationStatus = response.json().await.map_err(|e| {
                AuditError::delivery(format!("invalid email status response: {}", e))
            })?;

            match operation.state() {
                PollState::Succeeded => return Ok(()),
                PollState::Failed(reason) => {
                    return Err(AuditError::delivery(format!("email send failed: {}", reason)).into())
                }
                PollState::Pending => {
                    tracing::debug!(
                        status = operation.status.as_deref().unwrap_or("unknown"),
                        "email operation still running"
                    );
                }
            }
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[async_trait]
impl DeliveryBackend for CloudEmailBackend {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let (poll_url, initial) = self.submit(message).await?;

        if let Some(initial) = &initial {
            match initial.state() {
                PollState::Succeeded => return Ok(()),
                PollState::Failed(reason) => {
                    return Err(AuditError::delivery(format!("email send failed: {}", reason)).into())
                }
                PollState::Pending => {}
            }
        }

        tracing::debug!(operation = %poll_url, "email accepted, polling for completion");

        match tokio::time::timeout(self.poll.timeout, self.poll_until_terminal(&poll_url)).await {
            Ok(result) => result,
            Err(_) => Err(AuditError::DeliveryTimeout {
                operation: poll_url.to_string(),
                waited_secs: self.poll.timeout.as_secs(),
            }
            .into()),
        }
    }

    async fn test_connection(&self) -> bool {
        // no cheap liveness check; a constructed client is all that can be verified
        match self.send_url() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "cloud email endpoint is unusable");
                false
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "cloud-email"
    }
}
