//! Adapters - implementations of the ports against real infrastructure.

pub mod chat;
pub mod http;
pub mod pretix;
pub mod storage;
