//! BatchInviteHandler - retroactive invites for a whole event.

use std::sync::Arc;

use crate::adapters::pretix::PretixClient;
use crate::domain::identity::validate_chat_handle;
use crate::domain::ticketing::AttendeeRecord;
use crate::ports::{ChatService, FailedInvite};

use super::PipelineError;

/// Command to invite every not-yet-processed attendee of an event into one
/// room.
#[derive(Debug, Clone)]
pub struct BatchInviteCommand {
    /// Ticket-shop invite URL, ending in `/<organizer>/<event>`.
    pub invite_url: String,

    /// The room the invites go to.
    pub room_id: String,
}

/// Result of a completed batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchInviteResult {
    /// Number of attendees invited (or already members) this run.
    pub invited: usize,

    /// Invites the chat platform reported as failed.
    pub failed: Vec<FailedInvite>,

    /// Attendees whose answer was not a valid chat handle; handed back for
    /// manual follow-up.
    pub invalid: Vec<AttendeeRecord>,
}

/// Handler for the batch invite command.
///
/// Fetches every order of the event, extracts attendees not yet processed,
/// and runs one batched ensure-invited call against the room. Attendees the
/// platform accepted are marked processed; failed and invalid ones are
/// reported back and stay eligible for the next run.
pub struct BatchInviteHandler {
    pretix: Arc<PretixClient>,
    chat: Arc<dyn ChatService>,
}

impl BatchInviteHandler {
    pub fn new(pretix: Arc<PretixClient>, chat: Arc<dyn ChatService>) -> Self {
        Self { pretix, chat }
    }

    pub async fn handle(
        &self,
        cmd: BatchInviteCommand,
    ) -> Result<BatchInviteResult, PipelineError> {
        if !self.pretix.is_authorized().await {
            return Err(PipelineError::NotAuthorized);
        }

        let (organizer, event) = PretixClient::parse_invite_url(&cmd.invite_url)?;
        let orders = self.pretix.fetch_orders(&organizer, &event, None).await?;
        let records = self.pretix.extract_answers(&orders, true).await;
        tracing::info!(
            %organizer,
            %event,
            pending = records.len(),
            "starting batch invite"
        );

        // Partition by handle validity; bare localparts get the sigil fixed.
        let mut valid: Vec<(AttendeeRecord, String)> = Vec::new();
        let mut invalid: Vec<AttendeeRecord> = Vec::new();
        for record in records {
            match validate_chat_handle(record.chat_handle(), true) {
                Ok(user_id) => valid.push((record, user_id)),
                Err(e) => {
                    tracing::warn!(
                        order = %record.order_code(),
                        handle = %record.chat_handle(),
                        error = %e,
                        "skipping attendee with invalid handle"
                    );
                    invalid.push(record);
                }
            }
        }

        if valid.is_empty() {
            return Ok(BatchInviteResult {
                invalid,
                ..BatchInviteResult::default()
            });
        }

        let user_ids: Vec<String> = valid.iter().map(|(_, id)| id.clone()).collect();
        let failed = self.chat.ensure_invited(&cmd.room_id, &user_ids).await?;

        // Mark processed only what the platform accepted.
        let accepted: Vec<AttendeeRecord> = valid
            .into_iter()
            .filter(|(_, user_id)| !failed.iter().any(|f| &f.user_id == user_id))
            .map(|(record, _)| record)
            .collect();
        self.pretix.mark_processed(&accepted, false).await?;

        Ok(BatchInviteResult {
            invited: accepted.len(),
            failed,
            invalid,
        })
    }
}
