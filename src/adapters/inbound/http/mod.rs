/// HTTP front-end over the credential audit port
mod error;
mod routes;
mod server;

pub use error::{ApiError, ApiErrorResponse};
pub use server::{build_router, serve};

use crate::ports::inbound::CredentialAuditPort;
use std::sync::Arc;

/// Shared handler state
pub type AppState = Arc<dyn CredentialAuditPort>;
