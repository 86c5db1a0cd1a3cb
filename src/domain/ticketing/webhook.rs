//! Inbound webhook notification payload.

use serde::{Deserialize, Serialize};

/// Action string the platform sends when an order is paid.
///
/// Any other action is acknowledged but ignored.
pub const ORDER_PAID_ACTION: &str = "pretix.event.order.paid";

/// JSON body of one webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWebhook {
    /// Delivery identifier assigned by the sender.
    #[serde(default)]
    pub notification_id: Option<i64>,

    /// Organizer slug.
    pub organizer: String,

    /// Event slug.
    pub event: String,

    /// Order code the notification refers to.
    pub code: String,

    /// Notification action, e.g. `pretix.event.order.paid`.
    pub action: String,
}

impl OrderWebhook {
    /// Whether this notification announces a paid order.
    pub fn is_order_paid(&self) -> bool {
        self.action == ORDER_PAID_ACTION
    }
}
