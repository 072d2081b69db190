/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod console;
pub mod formatters;
pub mod mail;
pub mod network;
