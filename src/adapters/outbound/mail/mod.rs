/// Mail delivery adapters
mod cloud_email_backend;
mod request_signer;
mod smtp_backend;

pub use cloud_email_backend::{CloudEmailAuth, CloudEmailBackend, COMMUNICATION_SCOPE};
pub use request_signer::RequestSigner;
pub use smtp_backend::SmtpBackend;
