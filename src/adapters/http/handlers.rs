//! HTTP handlers for the webhook endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::application::handlers::WebhookDisposition;
use crate::application::BridgeService;
use crate::domain::ticketing::OrderWebhook;

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BridgeService>,
}

/// `POST /webhooks/pretix`.
///
/// Always acknowledges with 200: the ticketing platform disables endpoints
/// that keep failing, and a rejected or failed delivery is our problem, not
/// the sender's. Outcomes are logged; failed orders stay unprocessed and come
/// back through redelivery.
pub async fn receive_pretix_webhook(State(state): State<AppState>, body: String) -> StatusCode {
    let payload: OrderWebhook = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "undecodable webhook payload");
            return StatusCode::OK;
        }
    };

    match state.service.handle_order_webhook(&payload).await {
        Ok(WebhookDisposition::Invited {
            order_code,
            invited_rooms,
        }) => {
            tracing::info!(%order_code, rooms = invited_rooms.len(), "webhook handled");
        }
        Ok(WebhookDisposition::Skipped { reason }) => {
            tracing::debug!(code = %payload.code, %reason, "webhook skipped");
        }
        Err(e) => {
            tracing::error!(code = %payload.code, error = %e, "webhook pipeline failed");
        }
    }
    StatusCode::OK
}

/// `GET /health`.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
