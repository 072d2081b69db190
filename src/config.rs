//! Configuration for credwatch.
//!
//! Secrets and endpoints come from the environment. Non-secret tuning can
//! also come from a `credwatch.config.yml` file; environment values win.
//! Everything is read through a key-lookup closure so callers decide where
//! values come from.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::application::DailySchedule;
use crate::credential_audit::domain::ThresholdSet;
use crate::shared::{AuditError, Result};

pub const CONFIG_FILENAME: &str = "credwatch.config.yml";

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 120;

/// Optional YAML file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub check_time: Option<String>,
    pub thresholds: Option<Vec<i64>>,
    pub email_poll: Option<EmailPollFile>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct EmailPollFile {
    pub interval_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        tracing::warn!(field = %key, "unknown config field will be ignored");
    }
}

/// Client-credentials registration used to read the directory
#[derive(Clone)]
pub struct DirectoryConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub authority_host: String,
    pub graph_base_url: String,
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("authority_host", &self.authority_host)
            .field("graph_base_url", &self.graph_base_url)
            .finish()
    }
}

impl DirectoryConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hint = "Set AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET for an app registration with Application.Read.All";
        Ok(Self {
            tenant_id: required(lookup, "AZURE_TENANT_ID", hint)?,
            client_id: required(lookup, "AZURE_CLIENT_ID", hint)?,
            client_secret: required(lookup, "AZURE_CLIENT_SECRET", hint)?,
            authority_host: optional(lookup, "AZURE_AUTHORITY_HOST")
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            graph_base_url: optional(lookup, "GRAPH_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string()),
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub secure: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("secure", &self.secure)
            .finish()
    }
}

/// Cloud email resource. Without an access key, requests carry a
/// directory bearer token instead.
#[derive(Clone, PartialEq, Eq)]
pub struct CloudEmailConfig {
    pub endpoint: String,
    pub access_key: Option<String>,
}

impl std::fmt::Debug for CloudEmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudEmailConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl CloudEmailConfig {
    /// Parses `endpoint=https://...;accesskey=...`
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut access_key = None;

        for part in connection_string.split(';').map(str::trim) {
            if part.is_empty() {
                continue;
            }
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim().to_string()),
                "accesskey" => access_key = Some(value.trim().to_string()),
                _ => {}
            }
        }

        let endpoint = endpoint.filter(|e| !e.is_empty()).ok_or_else(|| {
            AuditError::config(
                "ACS_CONNECTION_STRING has no endpoint",
                "Use the form endpoint=https://<resource>.communication.azure.com/;accesskey=<key>",
            )
        })?;

        Ok(Self {
            endpoint,
            access_key: access_key.filter(|k| !k.is_empty()),
        })
    }
}

/// Exactly one delivery backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailProvider {
    Smtp(SmtpConfig),
    CloudEmail(CloudEmailConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub from: String,
    pub to: Vec<String>,
    pub provider: MailProvider,
}

impl MailConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let to: Vec<String> = optional(lookup, "MAIL_TO")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect();
        if to.is_empty() {
            return Err(AuditError::config(
                "MAIL_TO is not set",
                "Set MAIL_TO to one or more comma-separated recipient addresses",
            )
            .into());
        }
        if let Some(bad) = to.iter().find(|address| !address.contains('@')) {
            return Err(AuditError::config(
                format!("MAIL_TO contains an invalid address '{}'", bad),
                "Each MAIL_TO entry must be an email address",
            )
            .into());
        }

        let from = required(
            lookup,
            "MAIL_FROM",
            "Set MAIL_FROM to the sender address allowed by your mail backend",
        )?;

        Ok(Self {
            from,
            to,
            provider: Self::provider_from_lookup(lookup)?,
        })
    }

    fn provider_from_lookup<F>(lookup: &F) -> Result<MailProvider>
    where
        F: Fn(&str) -> Option<String>,
    {
        let smtp_host = optional(lookup, "SMTP_HOST");
        let connection_string = optional(lookup, "ACS_CONNECTION_STRING");
        let acs_endpoint = optional(lookup, "ACS_ENDPOINT");

        match (smtp_host, connection_string, acs_endpoint) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(AuditError::config(
                "both SMTP and cloud email delivery are configured",
                "Set either SMTP_HOST or ACS_CONNECTION_STRING/ACS_ENDPOINT, not both",
            )
            .into()),
            (Some(host), None, None) => {
                let port = match optional(lookup, "SMTP_PORT") {
                    Some(raw) => parse_port("SMTP_PORT", &raw)?,
                    None => DEFAULT_SMTP_PORT,
                };
                Ok(MailProvider::Smtp(SmtpConfig {
                    host,
                    port,
                    username: optional(lookup, "SMTP_USER"),
                    password: optional(lookup, "SMTP_PASS"),
                    secure: optional(lookup, "SMTP_SECURE")
                        .map(|v| parse_flag(&v))
                        .unwrap_or(false),
                }))
            }
            (None, Some(connection_string), _) => Ok(MailProvider::CloudEmail(
                CloudEmailConfig::from_connection_string(&connection_string)?,
            )),
            (None, None, Some(endpoint)) => Ok(MailProvider::CloudEmail(CloudEmailConfig {
                endpoint,
                access_key: optional(lookup, "ACS_ACCESS_KEY"),
            })),
            (None, None, None) => Err(AuditError::config(
                "no mail delivery backend is configured",
                "Set SMTP_HOST for SMTP delivery, or ACS_CONNECTION_STRING / ACS_ENDPOINT for cloud email",
            )
            .into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match optional(lookup, "PORT") {
            Some(raw) => parse_port("PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        Ok(Self {
            host: optional(lookup, "HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Poll cadence and bound for asynchronous email sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailPollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for EmailPollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        }
    }
}

impl EmailPollConfig {
    fn from_file(file: Option<&EmailPollFile>) -> Result<Self> {
        let defaults = Self::default();
        let Some(file) = file else {
            return Ok(defaults);
        };

        let interval = file
            .interval_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.interval);
        let timeout = file
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        if interval.is_zero() || timeout.is_zero() {
            return Err(AuditError::config(
                "email_poll.interval_secs and email_poll.timeout_secs must be positive",
                "Remove the email_poll section to use the defaults (2s / 120s)",
            )
            .into());
        }

        Ok(Self { interval, timeout })
    }
}

/// Schedule and threshold tuning, merged from environment and file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTuning {
    pub schedule: DailySchedule,
    pub thresholds: ThresholdSet,
    pub email_poll: EmailPollConfig,
}

impl AuditTuning {
    pub fn from_lookup<F>(lookup: &F, file: Option<&ConfigFile>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let check_time = optional(lookup, "CHECK_TIME")
            .or_else(|| file.and_then(|f| f.check_time.clone()));
        let schedule = match check_time {
            Some(raw) => DailySchedule::parse(&raw).map_err(|message| {
                AuditError::config(
                    format!("CHECK_TIME '{}' is invalid: {}", raw, message),
                    "Use a 24-hour UTC time such as 09:00",
                )
            })?,
            None => DailySchedule::default(),
        };

        let thresholds = match optional(lookup, "EXPIRATION_THRESHOLDS") {
            Some(raw) => ThresholdSet::parse_strict(&raw).map_err(|message| {
                AuditError::config(
                    format!("EXPIRATION_THRESHOLDS is invalid: {}", message),
                    "Use a comma-separated list of day counts such as 15,10,5,1,0",
                )
            })?,
            None => file
                .and_then(|f| f.thresholds.clone())
                .map(ThresholdSet::new)
                .unwrap_or_default(),
        };

        Ok(Self {
            schedule,
            thresholds,
            email_poll: EmailPollConfig::from_file(file.and_then(|f| f.email_poll.as_ref()))?,
        })
    }
}

/// Everything the `serve` and `check` commands need
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directory: DirectoryConfig,
    pub mail: MailConfig,
    pub server: ServerConfig,
    pub tuning: AuditTuning,
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: &F, file: Option<&ConfigFile>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            directory: DirectoryConfig::from_lookup(lookup)?,
            mail: MailConfig::from_lookup(lookup)?,
            server: ServerConfig::from_lookup(lookup)?,
            tuning: AuditTuning::from_lookup(lookup, file)?,
        })
    }
}

/// Reads a variable from the process environment
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, key: &str, hint: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)
        .ok_or_else(|| AuditError::config(format!("{} is not set", key), hint).into())
}

fn parse_port(key: &str, raw: &str) -> Result<u16> {
    raw.parse::<u16>().map_err(|_| {
        AuditError::config(
            format!("{} '{}' is not a valid port", key, raw),
            format!("Set {} to a number between 1 and 65535", key),
        )
        .into()
    })
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
