use std::fmt;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes let process supervisors distinguish a bad invocation
/// from a failed audit run or an unusable configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (configuration, directory, token or delivery failure)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Failures of the credential audit pipeline.
///
/// Raised as `anyhow::Error` through `shared::Result`; callers that need to
/// branch on the kind use `err.downcast_ref::<AuditError>()`.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Client-credentials exchange failed. Fatal for the current run, never retried.
    #[error("Failed to acquire directory access token\nDetails: {details}\n\n💡 Hint: Verify the tenant id, client id and client secret")]
    Auth { details: String },

    /// A directory listing page failed. `status` is 0 when no response arrived;
    /// transport and decode failures keep their cause in the error chain.
    #[error("Directory request failed with status {status}: {url}")]
    Directory { status: u16, url: String },

    /// Sending or polling an email failed.
    #[error("Failed to deliver notification email\nDetails: {details}")]
    Delivery { details: String },

    /// The cloud email operation did not reach a terminal state in time.
    #[error("Timed out after {waited_secs}s waiting for email operation {operation} to complete")]
    DeliveryTimeout { operation: String, waited_secs: u64 },

    /// Missing or malformed configuration. Never retried.
    #[error("Invalid configuration: {message}\n\n💡 Hint: {hint}")]
    Config { message: String, hint: String },
}

impl AuditError {
    pub fn auth(details: impl Into<String>) -> Self {
        AuditError::Auth {
            details: details.into(),
        }
    }

    pub fn delivery(details: impl Into<String>) -> Self {
        AuditError::Delivery {
            details: details.into(),
        }
    }

    pub fn config(message: impl Into<String>, hint: impl Into<String>) -> Self {
        AuditError::Config {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Short machine-friendly label, used in logs and HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::Auth { .. } => "auth",
            AuditError::Directory { .. } => "directory",
            AuditError::Delivery { .. } | AuditError::DeliveryTimeout { .. } => "delivery",
            AuditError::Config { .. } => "config",
        }
    }
}
