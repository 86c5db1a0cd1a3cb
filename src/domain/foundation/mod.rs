//! Shared domain primitives.

mod event_key;

pub use event_key::EventKey;
