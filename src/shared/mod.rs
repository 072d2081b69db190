//! Error types and the crate-wide `Result` alias
pub mod error;
pub mod result;

pub use error::{AuditError, ExitCode};
pub use result::Result;
