//! Pretix adapter - the authenticated, paginating ticketing API client.
//!
//! Split across two files: `oauth` carries the credential lifecycle
//! (authorize, exchange, transparent refresh, persistence), `client` the API
//! operations built on top of it (order fetching, answer extraction, webhook
//! validation, dedup bookkeeping).

mod client;
mod oauth;

pub use client::{InviteUrlError, PretixClient, PretixError, WebhookOutcome};
pub use oauth::AuthError;
