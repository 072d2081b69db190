//! credwatch - expiration audit for directory application credentials
//!
//! Lists service principals and app registrations from the identity
//! directory, merges them into one view per application, flags secrets and
//! certificates that are about to expire and emails a report to operators,
//! daily and on demand.
//!
//! # Architecture
//!
//! - **Domain Layer** (`credential_audit`): credential descriptors, reconciliation and threshold filtering
//! - **Application Layer** (`application`): the audit use case, notifier and scheduler
//! - **Ports** (`ports`): interfaces for tokens, the directory, mail delivery and the HTTP front-end
//! - **Adapters** (`adapters`): Graph and OAuth clients, SMTP and cloud email backends, the axum API
//! - **Shared** (`shared`): error taxonomy and the `Result` alias
//!
//! # Example
//!
//! ```no_run
//! use credwatch::prelude::*;
//!
//! # async fn run(directory: impl DirectoryRepository + 'static) -> Result<()> {
//! let use_case = AuditCredentialsUseCase::new(directory);
//! let report = use_case
//!     .execute(AuditRequest::new(ThresholdSet::default()))
//!     .await?;
//!
//! for item in report.notification_items() {
//!     println!("{} has {} credential(s) to rotate", item.application_name, item.credentials.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod credential_audit;
pub mod logging;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::inbound::http::{build_router, serve, AppState};
    pub use crate::adapters::outbound::console::{ApplicationListing, StdoutPresenter};
    pub use crate::adapters::outbound::formatters::EmailReportFormatter;
    pub use crate::adapters::outbound::network::{
        build_http_client, CachingTokenProvider, ClientCredentialsTokenClient,
        GraphDirectoryClient,
    };
    pub use crate::application::dto::{AuditReport, AuditRequest};
    pub use crate::application::factories::DeliveryBackendFactory;
    pub use crate::application::use_cases::AuditCredentialsUseCase;
    pub use crate::application::{CredentialScheduler, DailySchedule, Notifier, RunTrigger};
    pub use crate::credential_audit::domain::{
        ApplicationRecord, ApplicationView, CredentialDescriptor, CredentialKind,
        CredentialSource, DirectoryEntity, KeyCredentialRecord, NotificationItem,
        PasswordCredentialRecord, ServicePrincipalRecord, ThresholdSet,
    };
    pub use crate::credential_audit::services::{Reconciler, ThresholdFilter};
    pub use crate::ports::inbound::{CredentialAuditPort, RunOutcome, ServiceReport};
    pub use crate::ports::outbound::{
        AccessToken, AccessTokenProvider, DeliveryBackend, DirectoryRepository, EmailMessage,
        NotificationFormatter, OutputPresenter, RenderedReport,
    };
    pub use crate::shared::{AuditError, ExitCode, Result};
}
