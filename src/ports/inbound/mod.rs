/// Inbound ports (Driving ports) - Use case interfaces
///
/// These ports define the interfaces that external adapters (HTTP, CLI)
/// use to interact with the application core.
pub mod credential_audit_port;

pub use credential_audit_port::{CredentialAuditPort, RunOutcome, ServiceReport};
