//! The simplified attendee identity view derived from an order.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Keys used in [`AttendeeRecord::extra`] for order metadata and secondary
/// identifiers.
pub mod extra_keys {
    /// Buyer email address.
    pub const EMAIL: &str = "email";
    /// Order creation datetime, as the platform reports it.
    pub const ORDER_DATETIME: &str = "datetime";
    /// Position pseudonymization identifier.
    pub const PSEUDONYMIZATION_ID: &str = "pseudonymization_id";
    /// Invoice address name.
    pub const INVOICE_NAME: &str = "invoice_name";
    /// Secondary account identifier (the `fas` question answer).
    pub const FAS_ACCOUNT: &str = "fas";
}

/// One attendee derived from one distinct order.
///
/// Built from one or more raw order payloads; immutable once built. Equality
/// and hashing cover `(order_code, chat_handle)` only, so metadata captured
/// in `extra` never affects dedup.
#[derive(Debug, Clone)]
pub struct AttendeeRecord {
    order_code: String,
    chat_handle: String,
    extra: HashMap<String, String>,
}

impl AttendeeRecord {
    /// Build a record from its identity pair and collected metadata.
    pub fn new(
        order_code: impl Into<String>,
        chat_handle: impl Into<String>,
        extra: HashMap<String, String>,
    ) -> Self {
        Self {
            order_code: order_code.into(),
            chat_handle: chat_handle.into(),
            extra,
        }
    }

    pub fn order_code(&self) -> &str {
        &self.order_code
    }

    /// The attendee's chat handle as answered on the order. May be empty when
    /// the attendee left the question blank; handle validation happens at
    /// invite time, not here.
    pub fn chat_handle(&self) -> &str {
        &self.chat_handle
    }

    /// Order metadata and secondary identifiers, keyed by [`extra_keys`].
    pub fn extra(&self) -> &HashMap<String, String> {
        &self.extra
    }
}

impl PartialEq for AttendeeRecord {
    fn eq(&self, other: &Self) -> bool {
        self.order_code == other.order_code && self.chat_handle == other.chat_handle
    }
}

impl Eq for AttendeeRecord {}

impl Hash for AttendeeRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_code.hash(state);
        self.chat_handle.hash(state);
    }
}
