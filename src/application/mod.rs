/// Application layer - Use cases and DTOs
///
/// This layer contains the application logic that orchestrates
/// domain services and coordinates with infrastructure through ports.
pub mod dto;
pub mod factories;
pub mod use_cases;

mod notifier;
mod scheduler;

pub use notifier::Notifier;
pub use scheduler::{CredentialScheduler, DailySchedule, RunTrigger};
