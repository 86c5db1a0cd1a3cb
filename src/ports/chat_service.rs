//! ChatService port - the chat platform's membership capability.
//!
//! The bridge never speaks the chat protocol itself; it consumes an opaque
//! "invite this user into that room" capability. A production deployment
//! plugs in a real protocol client; tests plug in recording mocks.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the chat platform.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("chat room {0} not found")]
    RoomNotFound(String),

    #[error("chat alias {0} could not be resolved")]
    AliasNotFound(String),

    #[error("chat network failure: {0}")]
    Network(String),
}

/// One invite the platform reported as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedInvite {
    /// The user the invite was addressed to.
    pub user_id: String,

    /// The platform's reason, for operator follow-up.
    pub reason: String,
}

/// Port for chat-room membership operations.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Resolve a room alias (`#name:server`) to its canonical room id.
    async fn resolve_alias(&self, alias: &str) -> Result<String, ChatError>;

    /// Invite one user into one room.
    async fn invite(&self, room_id: &str, user_id: &str) -> Result<(), ChatError>;

    /// Ensure every listed user is a member of or invited to the room,
    /// inviting whoever is neither. Per-user failures are reported back
    /// rather than aborting the batch.
    async fn ensure_invited(
        &self,
        room_id: &str,
        user_ids: &[String],
    ) -> Result<Vec<FailedInvite>, ChatError>;
}
