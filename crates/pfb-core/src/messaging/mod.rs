//! Messenger-facing abstractions: inbound update model, outbound types, and the port.

pub mod port;
pub mod types;
pub mod update;
