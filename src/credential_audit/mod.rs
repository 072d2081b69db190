//! Credential audit domain: value objects plus the pure reconcile/filter services
pub mod domain;
pub mod services;
