use crate::credential_audit::domain::NotificationItem;
use crate::ports::outbound::{DeliveryBackend, EmailMessage, NotificationFormatter};
use crate::shared::Result;

/// Renders flagged applications into one email and hands it to the
/// configured delivery backend.
pub struct Notifier {
    backend: Box<dyn DeliveryBackend>,
    formatter: Box<dyn NotificationFormatter>,
    from: String,
    to: Vec<String>,
}

impl Notifier {
    pub fn new(
        backend: Box<dyn DeliveryBackend>,
        formatter: Box<dyn NotificationFormatter>,
        from: String,
        to: Vec<String>,
    ) -> Self {
        Self {
            backend,
            formatter,
            from,
            to,
        }
    }

    /// Sends the report. An empty list sends nothing.
    ///
    /// # Errors
    /// Delivery failures from the backend, unretried
    pub async fn notify(&self, items: &[NotificationItem]) -> Result<()> {
        if items.is_empty() {
            tracing::info!("no expiring credentials, nothing to send");
            return Ok(());
        }

        let report = self.formatter.render(items);
        let message = EmailMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: report.subject,
            html_body: report.html_body,
            text_body: report.text_body,
        };

        self.backend.send(&message).await?;

        tracing::info!(
            backend = self.backend.backend_name(),
            applications = items.len(),
            recipients = self.to.len(),
            "expiration report sent"
        );
        Ok(())
    }

    pub async fn test_connection(&self) -> bool {
        self.backend.test_connection().await
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }
}
