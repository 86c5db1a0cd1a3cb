//! Application layer - pipeline handlers and the composed bridge service.

pub mod handlers;
mod service;

pub use service::{BridgeService, StatusReport};
