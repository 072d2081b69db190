use super::{ApplicationView, CredentialDescriptor};
use chrono::{DateTime, Utc};

/// Placeholder shown for credentials created without a description
pub const UNNAMED_CREDENTIAL: &str = "Unnamed";

/// Flattened, report-ready summary of one flagged credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSummary {
    pub credential_type: &'static str,
    pub name: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub is_expired: bool,
}

impl CredentialSummary {
    pub fn from_descriptor(descriptor: &CredentialDescriptor) -> Self {
        Self {
            credential_type: descriptor.kind().label(),
            name: descriptor.display_name().map(str::to_string),
            expires_at: descriptor.expires_at(),
            days_remaining: descriptor.days_until_expiration(),
            is_expired: descriptor.is_expired(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_CREDENTIAL)
    }

    /// "EXPIRED" or "Expires in N day(s)"
    pub fn status_label(&self) -> String {
        if self.is_expired {
            "EXPIRED".to_string()
        } else if self.days_remaining == 1 {
            "Expires in 1 day".to_string()
        } else {
            format!("Expires in {} days", self.days_remaining)
        }
    }

    pub fn formatted_expiration(&self) -> String {
        self.expires_at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

/// One application's entry in the notification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub application_name: String,
    pub application_id: String,
    pub credentials: Vec<CredentialSummary>,
}

impl NotificationItem {
    pub fn from_view(view: &ApplicationView) -> Self {
        Self {
            application_name: view.display_name().to_string(),
            application_id: view.app_id().to_string(),
            credentials: view
                .credentials()
                .map(CredentialSummary::from_descriptor)
                .collect(),
        }
    }

    pub fn from_views(views: &[ApplicationView]) -> Vec<Self> {
        views.iter().map(Self::from_view).collect()
    }
}
