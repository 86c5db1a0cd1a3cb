//! Pipeline handlers - one struct per use case: the webhook flow and the
//! batch invite flow.

mod batch_invite;
mod handle_order_webhook;

pub use batch_invite::{BatchInviteCommand, BatchInviteHandler, BatchInviteResult};
pub use handle_order_webhook::{HandleOrderWebhookHandler, WebhookDisposition};

use thiserror::Error;

use crate::adapters::pretix::{InviteUrlError, PretixError};
use crate::domain::identity::HandleError;
use crate::ports::{ChatError, StoreError};

/// Errors crossing the pipeline boundary.
///
/// None of these are fatal to the process: the webhook endpoint acknowledges
/// the delivery regardless, and the batch command reports them to the
/// operator.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("not authorized against the ticketing instance")]
    NotAuthorized,

    #[error(transparent)]
    InviteUrl(#[from] InviteUrlError),

    #[error("attendee chat handle is invalid: {0}")]
    Handle(#[from] HandleError),

    #[error(transparent)]
    Pretix(#[from] PretixError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no rooms are configured for {organizer}/{event}")]
    NoRoomsConfigured { organizer: String, event: String },

    #[error("every room invite failed for order {order_code}")]
    AllInvitesFailed { order_code: String },
}
