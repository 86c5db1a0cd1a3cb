//! Axum router for the bridge's HTTP surface.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{health, receive_pretix_webhook, AppState};

/// Build the application router.
///
/// # Routes
/// - `POST /webhooks/pretix` - inbound paid-order deliveries (always 200)
/// - `GET /health` - liveness probe
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/pretix", post(receive_pretix_webhook))
        .route("/health", get(health))
        .with_state(state)
}
