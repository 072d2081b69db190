use crate::shared::Result;
use async_trait::async_trait;

/// Fully rendered email, independent of the transport that sends it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// DeliveryBackend port for sending notification emails
///
/// Selected once from configuration; callers never branch on which
/// transport is behind it.
#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    /// Sends the message, returning once the transport reports success
    ///
    /// # Errors
    /// Returns `AuditError::Delivery` (or `AuditError::DeliveryTimeout`) when the
    /// message is rejected, the transport is unreachable, or an asynchronous
    /// send ends in a failed state. Never retried here.
    async fn send(&self, message: &EmailMessage) -> Result<()>;

    /// Backend-specific liveness check. Reports failure as `false`.
    async fn test_connection(&self) -> bool;

    /// Short name for logs ("smtp", "cloud-email")
    fn backend_name(&self) -> &'static str;
}
