//! Core domain + application logic for the poster browsing bot.
//!
//! This crate is framework-agnostic. The Bot API, the search service and the
//! session cache backend live behind ports (traits) implemented in adapter crates.

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod media;
pub mod messaging;
pub mod navigation;
pub mod ports;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::{Error, Result};
