use crate::credential_audit::domain::{ApplicationView, NotificationItem};

/// AuditReport - Result of one reconcile-and-filter pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// Number of reconciled applications
    pub applications_scanned: usize,
    /// Applications with at least one flagged credential, carrying only those credentials
    pub flagged: Vec<ApplicationView>,
}

impl AuditReport {
    pub fn notification_items(&self) -> Vec<NotificationItem> {
        NotificationItem::from_views(&self.flagged)
    }

    pub fn has_findings(&self) -> bool {
        !self.flagged.is_empty()
    }
}
