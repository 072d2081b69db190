pub mod application_view;
pub mod credential;
pub mod directory_record;
pub mod notification_item;
pub mod thresholds;

pub use application_view::ApplicationView;
pub use credential::{days_until, CredentialDescriptor, CredentialKind, CredentialSource};
pub use directory_record::{
    ApplicationRecord, DirectoryEntity, KeyCredentialRecord, PasswordCredentialRecord,
    ServicePrincipalRecord,
};
pub use notification_item::{CredentialSummary, NotificationItem, UNNAMED_CREDENTIAL};
pub use thresholds::{ThresholdSet, DEFAULT_THRESHOLDS};
