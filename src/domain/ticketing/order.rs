//! Raw order payloads as the ticketing API returns them.
//!
//! Only the fields the bridge consumes are modeled; everything else in the
//! (large) order document is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// One page of the `{results, next}` pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersPage {
    /// Orders on this page.
    #[serde(default)]
    pub results: Vec<Order>,

    /// Cursor URL of the next page, absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// One purchase transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order code, the platform-wide identifier of this purchase.
    pub code: String,

    /// Buyer email.
    #[serde(default)]
    pub email: Option<String>,

    /// Order creation datetime (kept as the platform's string form).
    #[serde(default)]
    pub datetime: Option<String>,

    /// Invoice address block.
    #[serde(default)]
    pub invoice_address: Option<InvoiceAddress>,

    /// Line items of the order.
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// Invoice address; only the name is consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceAddress {
    #[serde(default)]
    pub name: Option<String>,
}

/// One line item within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Order code this position belongs to.
    pub order: String,

    /// Ticket item identifier.
    #[serde(default)]
    pub item: Option<i64>,

    /// Ticket variant identifier, if the item has variants.
    #[serde(default)]
    pub variation: Option<i64>,

    /// Pseudonymization identifier of this position.
    #[serde(default)]
    pub pseudonymization_id: Option<String>,

    /// Custom question answers attached to this position.
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Position {
    /// Item identifier in the normalized string form the routing table
    /// compares against.
    pub fn item_key(&self) -> Option<String> {
        self.item.map(|i| i.to_string())
    }

    /// Variant identifier in normalized string form.
    pub fn variant_key(&self) -> Option<String> {
        self.variation.map(|v| v.to_string())
    }
}

/// One answered custom question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Stable question identifier configured on the platform.
    pub question_identifier: String,

    /// The answer text.
    #[serde(default)]
    pub answer: String,
}
