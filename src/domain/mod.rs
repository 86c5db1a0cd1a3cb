//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives
//! - `identity` - Chat-handle grammar validation
//! - `routing` - Event-to-room routing table with conditional matching
//! - `ticketing` - Orders, attendees, webhook payloads, and the OAuth credential

pub mod foundation;
pub mod identity;
pub mod routing;
pub mod ticketing;
