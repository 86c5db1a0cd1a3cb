//! Stub implementation of ChatService for development and testing.
//!
//! Logs every membership operation and reports success. Replace with a real
//! protocol client (e.g., a Matrix client adapter) for production.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::ports::{ChatError, ChatService, FailedInvite};

/// Stub ChatService that records invites instead of delivering them.
///
/// For development and testing purposes only. Aliases resolve to themselves
/// with the sigil swapped, invites always succeed, and every call is logged.
#[derive(Debug, Default)]
pub struct StubChatService {
    invited: Mutex<Vec<(String, String)>>,
}

impl StubChatService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(room_id, user_id)` pair this stub was asked to invite.
    pub fn invited(&self) -> Vec<(String, String)> {
        self.invited.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl ChatService for StubChatService {
    async fn resolve_alias(&self, alias: &str) -> Result<String, ChatError> {
        let room_id = format!("!{}", alias.trim_start_matches('#'));
        tracing::debug!(alias, room_id, "stub alias resolution");
        Ok(room_id)
    }

    async fn invite(&self, room_id: &str, user_id: &str) -> Result<(), ChatError> {
        tracing::info!(room_id, user_id, "stub invite");
        self.invited
            .lock()
            .expect("lock poisoned")
            .push((room_id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn ensure_invited(
        &self,
        room_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<FailedInvite>, ChatError> {
        for user_id in user_ids {
            self.invite(room_id, user_id).await?;
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_invites_and_reports_no_failures() {
        let stub = StubChatService::new();
        let users = vec!["@a:example.org".to_string(), "@b:example.org".to_string()];

        let failed = stub.ensure_invited("!room:example.org", &users).await.unwrap();
        assert!(failed.is_empty());
        assert_eq!(
            stub.invited(),
            vec![
                ("!room:example.org".to_string(), "@a:example.org".to_string()),
                ("!room:example.org".to_string(), "@b:example.org".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn resolves_alias_by_swapping_sigil() {
        let stub = StubChatService::new();
        let room_id = stub.resolve_alias("#lobby:example.org").await.unwrap();
        assert_eq!(room_id, "!lobby:example.org");
    }
}
