/// Use cases module containing application business logic orchestration
mod audit_credentials;

pub use audit_credentials::AuditCredentialsUseCase;
