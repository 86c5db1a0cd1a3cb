//! Ticketing platform domain types.
//!
//! Raw order payloads as the API returns them, the attendee identity view
//! derived from them, the inbound webhook notification, and the OAuth2
//! credential used to talk to the platform.

mod attendee;
mod credential;
mod order;
mod webhook;

pub use attendee::{extra_keys, AttendeeRecord};
pub use credential::Credential;
pub use order::{Answer, InvoiceAddress, Order, OrdersPage, Position};
pub use webhook::{OrderWebhook, ORDER_PAID_ACTION};
