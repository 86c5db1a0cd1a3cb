//! HandleOrderWebhookHandler - pipeline for one paid-order webhook delivery.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::adapters::pretix::{PretixClient, WebhookOutcome};
use crate::domain::identity::validate_chat_handle;
use crate::domain::routing::RoutingTable;
use crate::domain::ticketing::OrderWebhook;
use crate::ports::ChatService;

use super::PipelineError;

/// What the pipeline did with one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookDisposition {
    /// The attendee was invited into at least one room and the order was
    /// marked processed.
    Invited {
        order_code: String,
        invited_rooms: Vec<String>,
    },

    /// The delivery was acknowledged but nothing was done (wrong action,
    /// duplicate delivery, empty order).
    Skipped { reason: String },
}

/// Handler for incoming paid-order webhook deliveries.
///
/// Validation and fetching are delegated to the ticketing client; this
/// handler owns routing, alias resolution, the invites themselves, and the
/// processed-order bookkeeping. An order is marked processed only after at
/// least one invite succeeds, so a delivery that fails end to end stays
/// retryable through webhook redelivery.
pub struct HandleOrderWebhookHandler {
    pretix: Arc<PretixClient>,
    chat: Arc<dyn ChatService>,
    routing: Arc<Mutex<RoutingTable>>,
}

impl HandleOrderWebhookHandler {
    pub fn new(
        pretix: Arc<PretixClient>,
        chat: Arc<dyn ChatService>,
        routing: Arc<Mutex<RoutingTable>>,
    ) -> Self {
        Self {
            pretix,
            chat,
            routing,
        }
    }

    pub async fn handle(
        &self,
        payload: &OrderWebhook,
    ) -> Result<WebhookDisposition, PipelineError> {
        // 1. Validate the delivery and fetch the order it names.
        let (organizer, event, attendee, item, variant) =
            match self.pretix.handle_incoming_webhook(payload).await? {
                WebhookOutcome::Rejected { reason } => {
                    tracing::debug!(code = %payload.code, %reason, "webhook skipped");
                    return Ok(WebhookDisposition::Skipped { reason });
                }
                WebhookOutcome::Accepted {
                    organizer,
                    event,
                    attendee,
                    item,
                    variant,
                } => (organizer, event, attendee, item, variant),
            };

        // 2. The handle must be a well-formed chat user id; a bare localpart
        //    gets its sigil prepended.
        let user_id = validate_chat_handle(attendee.chat_handle(), true)?;

        // 3. Rooms routed for this ticket item/variant.
        let associations = {
            let routing = self.routing.lock().await;
            routing.rooms_by_ticket_variant(
                &organizer,
                &event,
                item.as_deref().unwrap_or(""),
                variant.as_deref(),
            )
        };
        if associations.is_empty() {
            return Err(PipelineError::NoRoomsConfigured { organizer, event });
        }

        // 4. Invite into each room, resolving aliases first. Per-room
        //    failures are logged and counted, not fatal.
        let mut invited_rooms = Vec::new();
        for association in &associations {
            let room_id = if association.is_alias() {
                match self.chat.resolve_alias(&association.room_id).await {
                    Ok(room_id) => room_id,
                    Err(e) => {
                        tracing::warn!(
                            alias = %association.room_id,
                            error = %e,
                            "could not resolve room alias"
                        );
                        continue;
                    }
                }
            } else {
                association.room_id.clone()
            };

            match self.chat.invite(&room_id, &user_id).await {
                Ok(()) => {
                    tracing::info!(%room_id, %user_id, order = %payload.code, "invited");
                    invited_rooms.push(room_id);
                }
                Err(e) => {
                    tracing::warn!(%room_id, %user_id, error = %e, "invite failed");
                }
            }
        }

        // 5. Only a delivery with at least one successful invite is done.
        if invited_rooms.is_empty() {
            return Err(PipelineError::AllInvitesFailed {
                order_code: payload.code.clone(),
            });
        }

        self.pretix
            .mark_processed(std::slice::from_ref(&attendee), false)
            .await?;

        Ok(WebhookDisposition::Invited {
            order_code: payload.code.clone(),
            invited_rooms,
        })
    }
}
