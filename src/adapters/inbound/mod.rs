/// Inbound adapters - Front-ends driving the application through inbound ports
pub mod http;
