use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Client secret as returned by the directory API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCredentialRecord {
    pub key_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<DateTime<Utc>>,
}

/// Certificate as returned by the directory API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCredentialRecord {
    pub key_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub end_date_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "type")]
    pub key_type: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
}

/// Credential-bearing directory object.
///
/// Service principals and app registrations share this shape; they are told
/// apart only by which listing returned them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntity {
    pub id: String,
    pub app_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub password_credentials: Vec<PasswordCredentialRecord>,
    #[serde(default)]
    pub key_credentials: Vec<KeyCredentialRecord>,
}

pub type ServicePrincipalRecord = DirectoryEntity;
pub type ApplicationRecord = DirectoryEntity;
