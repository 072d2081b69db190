/// Crate-wide result type. Typed failures travel inside the `anyhow::Error`
/// as [`AuditError`](super::AuditError).
pub type Result<T> = std::result::Result<T, anyhow::Error>;
