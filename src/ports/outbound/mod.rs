/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define what the audit core needs from the outside world:
/// tokens, directory listings, email rendering and delivery.
pub mod delivery_backend;
pub mod directory_repository;
pub mod notification_formatter;
pub mod output_presenter;
pub mod token_provider;

pub use delivery_backend::{DeliveryBackend, EmailMessage};
pub use directory_repository::DirectoryRepository;
pub use notification_formatter::{NotificationFormatter, RenderedReport};
pub use output_presenter::OutputPresenter;
pub use token_provider::{AccessToken, AccessTokenProvider};
