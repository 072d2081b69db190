/// Mock implementations for testing
mod mock_delivery_backend;
mod mock_directory_repository;
mod mock_token_provider;

pub use mock_delivery_backend::MockDeliveryBackend;
pub use mock_directory_repository::{certificate, entity, secret, MockDirectoryRepository};
pub use mock_token_provider::MockTokenProvider;
