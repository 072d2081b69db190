use crate::credential_audit::domain::NotificationItem;

/// Subject plus the two equivalent bodies of a notification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// NotificationFormatter port for rendering the expiration report
///
/// The HTML and plain-text bodies must carry the same applications, in the
/// same order, with the same per-credential fields.
pub trait NotificationFormatter: Send + Sync {
    /// Renders the report for a non-empty list of flagged applications
    fn render(&self, items: &[NotificationItem]) -> RenderedReport;
}
