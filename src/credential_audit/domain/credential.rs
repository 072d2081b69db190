use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Which directory collection a credential was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialSource {
    ServicePrincipal,
    Application,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::ServicePrincipal => write!(f, "service principal"),
            CredentialSource::Application => write!(f, "app registration"),
        }
    }
}

/// Secret or certificate, with the certificate's type/usage tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CredentialKind {
    Secret,
    #[serde(rename_all = "camelCase")]
    Certificate {
        certificate_type: Option<String>,
        usage: Option<String>,
    },
}

impl CredentialKind {
    pub fn label(&self) -> &'static str {
        match self {
            CredentialKind::Secret => "Secret",
            CredentialKind::Certificate { .. } => "Certificate",
        }
    }
}

/// Whole days until `expires_at`, rounded up.
///
/// A credential twelve hours from expiry reports `1`; one whose instant is
/// exactly `now` reports `0`; anything already past reports zero or less.
pub fn days_until(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = expires_at - now;
    // truncation toward zero is already the ceiling for negative spans
    let days = remaining.num_days();
    if remaining > Duration::days(days) {
        days + 1
    } else {
        days
    }
}

/// Immutable view of one secret or certificate.
///
/// `days_until_expiration` and `is_expired` are computed once from the
/// retrieval instant passed to the constructor and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescriptor {
    key_id: String,
    display_name: Option<String>,
    expires_at: DateTime<Utc>,
    days_until_expiration: i64,
    is_expired: bool,
    source: CredentialSource,
    #[serde(flatten)]
    kind: CredentialKind,
}

impl CredentialDescriptor {
    pub fn new(
        key_id: String,
        display_name: Option<String>,
        expires_at: DateTime<Utc>,
        source: CredentialSource,
        kind: CredentialKind,
        now: DateTime<Utc>,
    ) -> Self {
        let days_until_expiration = days_until(expires_at, now);
        Self {
            key_id,
            display_name: display_name.filter(|name| !name.trim().is_empty()),
            expires_at,
            days_until_expiration,
            is_expired: days_until_expiration <= 0,
            source,
            kind,
        }
    }

    pub fn secret(
        key_id: String,
        display_name: Option<String>,
        expires_at: DateTime<Utc>,
        source: CredentialSource,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            key_id,
            display_name,
            expires_at,
            source,
            CredentialKind::Secret,
            now,
        )
    }

    pub fn certificate(
        key_id: String,
        display_name: Option<String>,
        expires_at: DateTime<Utc>,
        source: CredentialSource,
        certificate_type: Option<String>,
        usage: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            key_id,
            display_name,
            expires_at,
            source,
            CredentialKind::Certificate {
                certificate_type,
                usage,
            },
            now,
        )
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn days_until_expiration(&self) -> i64 {
        self.days_until_expiration
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn kind(&self) -> &CredentialKind {
        &self.kind
    }
}
