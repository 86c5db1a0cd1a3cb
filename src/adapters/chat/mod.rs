//! Chat adapters - implementations of the ChatService port.
//!
//! - `StubChatService` - Development/testing stub that logs and succeeds

mod stub_chat_service;

pub use stub_chat_service::StubChatService;
