//! BridgeService - the explicitly constructed composition root.
//!
//! Owns the routing table and its store, the ticketing client (which itself
//! owns the credential and the processed-order set), and the chat service
//! port. Every operator-facing operation and both pipelines hang off this
//! one object; `main` builds it once and shares it behind an `Arc`.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::adapters::pretix::{AuthError, PretixClient};
use crate::domain::routing::{FilterCondition, RoomAssociation, RoutingTable};
use crate::domain::ticketing::OrderWebhook;
use crate::ports::{ChatService, RoutingStore, StoreError};

use super::handlers::{
    BatchInviteCommand, BatchInviteHandler, BatchInviteResult, HandleOrderWebhookHandler,
    PipelineError, WebhookDisposition,
};

/// Operator-facing snapshot of the service's health.
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Whether a usable ticketing credential is held.
    pub authorized: bool,

    /// Human-readable authorization diagnostic.
    pub auth_diagnostic: String,

    /// Total room associations across all events.
    pub association_count: usize,
}

/// The composed bridge service.
pub struct BridgeService {
    pretix: Arc<PretixClient>,
    routing: Arc<Mutex<RoutingTable>>,
    routing_store: Arc<dyn RoutingStore>,
    webhook_handler: HandleOrderWebhookHandler,
    batch_handler: BatchInviteHandler,
    // Serializes the webhook check-then-mark sequence so concurrent
    // deliveries of the same order cannot both pass the dedup check.
    webhook_gate: Mutex<()>,
}

impl BridgeService {
    pub fn new(
        pretix: Arc<PretixClient>,
        chat: Arc<dyn ChatService>,
        routing_store: Arc<dyn RoutingStore>,
    ) -> Self {
        let routing = Arc::new(Mutex::new(RoutingTable::new()));
        Self {
            webhook_handler: HandleOrderWebhookHandler::new(
                pretix.clone(),
                chat.clone(),
                routing.clone(),
            ),
            batch_handler: BatchInviteHandler::new(pretix.clone(), chat),
            pretix,
            routing,
            routing_store,
            webhook_gate: Mutex::new(()),
        }
    }

    /// Load persisted state: the routing table snapshot plus the ticketing
    /// client's credential and processed-order set.
    pub async fn start(&self) -> Result<(), StoreError> {
        if let Some(table) = self.routing_store.load().await? {
            tracing::info!(
                associations = table.association_count(),
                "loaded routing table snapshot"
            );
            *self.routing.lock().await = table;
        }
        self.pretix.start().await
    }

    /// Write a final routing snapshot. Every mutation already persists, so
    /// this only matters when the store path changed underneath a running
    /// service; it mainly marks the lifecycle boundary in logs.
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        let routing = self.routing.lock().await;
        self.routing_store.save(&routing).await?;
        tracing::info!(
            associations = routing.association_count(),
            "final routing snapshot written"
        );
        Ok(())
    }

    // ── Pipelines ───────────────────────────────────────────────────────

    /// Run the webhook pipeline for one delivery.
    pub async fn handle_order_webhook(
        &self,
        payload: &OrderWebhook,
    ) -> Result<WebhookDisposition, PipelineError> {
        let _gate = self.webhook_gate.lock().await;
        self.webhook_handler.handle(payload).await
    }

    /// Run the batch invite pipeline.
    pub async fn batch_invite(
        &self,
        cmd: BatchInviteCommand,
    ) -> Result<BatchInviteResult, PipelineError> {
        self.batch_handler.handle(cmd).await
    }

    // ── Routing table management ────────────────────────────────────────

    /// Route a room for an event under a condition. Returns whether the
    /// table changed; the snapshot is persisted either way it did.
    pub async fn associate_room(
        &self,
        organizer: &str,
        event: &str,
        room_id: &str,
        condition: FilterCondition,
    ) -> Result<bool, StoreError> {
        let mut routing = self.routing.lock().await;
        let changed = routing.add(
            organizer,
            event,
            RoomAssociation::with_condition(room_id, condition),
        );
        if changed {
            self.routing_store.save(&routing).await?;
        }
        Ok(changed)
    }

    /// Remove the association carrying exactly this condition; conditioned
    /// siblings of the same room stay.
    pub async fn unassociate_room(
        &self,
        organizer: &str,
        event: &str,
        room_id: &str,
        condition: &FilterCondition,
    ) -> Result<bool, StoreError> {
        let mut routing = self.routing.lock().await;
        let changed = routing.remove(organizer, event, room_id, condition);
        if changed {
            self.routing_store.save(&routing).await?;
        }
        Ok(changed)
    }

    /// Drop every association for a room, everywhere. Returns how many were
    /// removed.
    pub async fn purge_room(&self, room_id: &str) -> Result<usize, StoreError> {
        let mut routing = self.routing.lock().await;
        let removed = routing.purge_room(room_id);
        if removed > 0 {
            self.routing_store.save(&routing).await?;
        }
        Ok(removed)
    }

    pub async fn room_is_mapped(&self, room_id: &str) -> bool {
        self.routing.lock().await.room_is_mapped(room_id)
    }

    /// `"organizer/event"` strings for every association of a room.
    pub async fn events_for_room(&self, room_id: &str) -> Vec<String> {
        self.routing.lock().await.events_for_room(room_id)
    }

    // ── Authorization ───────────────────────────────────────────────────

    /// The URL an operator visits to authorize this service.
    pub fn authorization_url(&self) -> String {
        self.pretix.authorization_url()
    }

    /// Finish the authorization from the operator's callback URL.
    pub async fn complete_authorization(&self, callback_url: &str) -> Result<(), AuthError> {
        self.pretix.complete_authorization(callback_url).await
    }

    /// Status snapshot: authorization state and routing summary.
    pub async fn status(&self) -> StatusReport {
        let (authorized, auth_diagnostic) = self.pretix.test_authorization().await;
        let association_count = self.routing.lock().await.association_count();
        StatusReport {
            authorized,
            auth_diagnostic,
            association_count,
        }
    }
}
