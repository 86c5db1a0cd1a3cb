//! The ticketing API client.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::PretixConfig;
use crate::domain::ticketing::{
    extra_keys, AttendeeRecord, Credential, Order, OrderWebhook, OrdersPage,
};
use crate::ports::{ProcessedOrderStore, StoreError, TokenStore};

use super::oauth::AuthError;

/// Errors from ticketing API operations.
#[derive(Debug, Error)]
pub enum PretixError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("ticketing API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("ticketing API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An invite URL that does not name an organizer and an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invite URL must end in /<organizer>/<event>: {0}")]
pub struct InviteUrlError(pub String);

/// Result of validating one webhook delivery.
#[derive(Debug, Clone)]
pub enum WebhookOutcome {
    /// The delivery names a paid, not-yet-processed order; the order was
    /// fetched and one attendee extracted from it.
    Accepted {
        organizer: String,
        event: String,
        attendee: AttendeeRecord,
        /// Item of the order's first position, normalized string form.
        item: Option<String>,
        /// Variant of the order's first position, normalized string form.
        variant: Option<String>,
    },

    /// The delivery was acknowledged but not acted on.
    Rejected { reason: String },
}

/// Authenticated, paginating client for the ticketing API.
///
/// Owns the OAuth credential (see `oauth.rs`) and the processed-order dedup
/// set. Both are loaded from their stores in [`PretixClient::start`] and
/// persisted on every change.
pub struct PretixClient {
    pub(super) config: PretixConfig,
    pub(super) http: reqwest::Client,
    pub(super) token_store: Arc<dyn TokenStore>,
    pub(super) credential: RwLock<Option<Credential>>,
    processed_store: Arc<dyn ProcessedOrderStore>,
    processed: RwLock<BTreeSet<String>>,
}

impl PretixClient {
    /// Build a client. Every request carries the configured timeout.
    pub fn new(
        config: PretixConfig,
        token_store: Arc<dyn TokenStore>,
        processed_store: Arc<dyn ProcessedOrderStore>,
    ) -> Result<Self, PretixError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http,
            token_store,
            credential: RwLock::new(None),
            processed_store,
            processed: RwLock::new(BTreeSet::new()),
        })
    }

    /// Seed session state from the persisted snapshots, so restarts neither
    /// force re-authorization nor re-invite processed orders.
    pub async fn start(&self) -> Result<(), StoreError> {
        if let Some(credential) = self.token_store.load().await? {
            tracing::info!(
                expires_at = %credential.expires_at,
                "loaded persisted ticketing credential"
            );
            *self.credential.write().await = Some(credential);
        }

        let processed = self.processed_store.load().await?;
        if !processed.is_empty() {
            tracing::info!(count = processed.len(), "loaded processed-order set");
        }
        *self.processed.write().await = processed;
        Ok(())
    }

    pub(super) fn api_base(&self) -> String {
        format!("{}/api/v1", self.config.instance_url.trim_end_matches('/'))
    }

    /// Extract `(organizer, event)` from a ticket-shop invite URL.
    ///
    /// # Errors
    ///
    /// Fails with [`InviteUrlError`] when the path lacks two non-empty
    /// trailing segments.
    pub fn parse_invite_url(url: &str) -> Result<(String, String), InviteUrlError> {
        let without_scheme = url.split("://").last().unwrap_or(url);
        let mut parts = without_scheme.split('/').filter(|s| !s.is_empty());
        let _host = parts.next();
        let path: Vec<&str> = parts.collect();

        match path.as_slice() {
            [.., organizer, event] => Ok((organizer.to_string(), event.to_string())),
            _ => Err(InviteUrlError(url.to_string())),
        }
    }

    /// Fetch raw orders for an event.
    ///
    /// Without `order_code`, follows the `{results, next}` pagination
    /// envelope until exhausted. With it, fetches exactly that one order.
    pub async fn fetch_orders(
        &self,
        organizer: &str,
        event: &str,
        order_code: Option<&str>,
    ) -> Result<Vec<Order>, PretixError> {
        let token = self.bearer_token().await?;
        let orders_base = format!(
            "{}/organizers/{organizer}/events/{event}/orders/",
            self.api_base()
        );

        if let Some(code) = order_code {
            let url = format!("{orders_base}{code}/");
            let order: Order = self.get_json(&url, &token).await?;
            return Ok(vec![order]);
        }

        let mut orders = Vec::new();
        let mut next = Some(orders_base);
        while let Some(url) = next {
            let page: OrdersPage = self.get_json(&url, &token).await?;
            orders.extend(page.results);
            next = page.next;
        }
        Ok(orders)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, PretixError> {
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PretixError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Build attendee records from raw orders.
    ///
    /// One record per distinct order code across all supplied pages:
    /// first-seen order metadata wins, question answers merge across
    /// positions. The `matrix` answer becomes the chat handle, the `fas`
    /// answer lands in `extra`. With `filter_processed`, records whose order
    /// code is already in the processed set are dropped.
    pub async fn extract_answers(
        &self,
        orders: &[Order],
        filter_processed: bool,
    ) -> Vec<AttendeeRecord> {
        struct Draft {
            chat_handle: String,
            extra: HashMap<String, String>,
        }

        let mut seen: Vec<String> = Vec::new();
        let mut drafts: HashMap<String, Draft> = HashMap::new();

        for order in orders {
            for position in &order.positions {
                let code = position.order.clone();
                let draft = drafts.entry(code.clone()).or_insert_with(|| {
                    seen.push(code.clone());

                    let mut extra = HashMap::new();
                    if let Some(email) = &order.email {
                        extra.insert(extra_keys::EMAIL.to_string(), email.clone());
                    }
                    if let Some(datetime) = &order.datetime {
                        extra.insert(extra_keys::ORDER_DATETIME.to_string(), datetime.clone());
                    }
                    if let Some(id) = &position.pseudonymization_id {
                        extra.insert(extra_keys::PSEUDONYMIZATION_ID.to_string(), id.clone());
                    }
                    if let Some(name) = order
                        .invoice_address
                        .as_ref()
                        .and_then(|a| a.name.as_ref())
                    {
                        extra.insert(extra_keys::INVOICE_NAME.to_string(), name.clone());
                    }

                    Draft {
                        chat_handle: String::new(),
                        extra,
                    }
                });

                for answer in &position.answers {
                    match answer.question_identifier.as_str() {
                        "matrix" => draft.chat_handle = answer.answer.clone(),
                        "fas" => {
                            draft
                                .extra
                                .insert(extra_keys::FAS_ACCOUNT.to_string(), answer.answer.clone());
                        }
                        _ => {}
                    }
                }
            }
        }

        let processed = self.processed.read().await;
        seen.into_iter()
            .filter(|code| !(filter_processed && processed.contains(code)))
            .filter_map(|code| {
                let draft = drafts.remove(&code)?;
                Some(AttendeeRecord::new(code, draft.chat_handle, draft.extra))
            })
            .collect()
    }

    /// Whether an order code is already in the dedup set.
    pub async fn is_processed(&self, order_code: &str) -> bool {
        self.processed.read().await.contains(order_code)
    }

    /// Record orders as processed and persist the set.
    ///
    /// With `replace=false` the codes are unioned in (idempotent); with
    /// `replace=true` the set is overwritten wholesale.
    pub async fn mark_processed(
        &self,
        records: &[AttendeeRecord],
        replace: bool,
    ) -> Result<(), StoreError> {
        let mut processed = self.processed.write().await;
        if replace {
            processed.clear();
        }
        for record in records {
            processed.insert(record.order_code().to_string());
        }
        self.processed_store.save(&processed).await
    }

    /// Validate one webhook delivery and, when it is actionable, fetch the
    /// order it names and extract its attendee.
    ///
    /// Never marks the order processed itself: only a downstream successful
    /// invite does, so a failed invite leaves the order retryable.
    pub async fn handle_incoming_webhook(
        &self,
        payload: &OrderWebhook,
    ) -> Result<WebhookOutcome, PretixError> {
        if !payload.is_order_paid() {
            return Ok(WebhookOutcome::Rejected {
                reason: format!("ignoring action {}", payload.action),
            });
        }

        if self.is_processed(&payload.code).await {
            return Ok(WebhookOutcome::Rejected {
                reason: format!("order {} has already been processed", payload.code),
            });
        }

        let orders = self
            .fetch_orders(&payload.organizer, &payload.event, Some(&payload.code))
            .await?;

        let first_position = orders.first().and_then(|o| o.positions.first());
        let item = first_position.and_then(|p| p.item_key());
        let variant = first_position.and_then(|p| p.variant_key());

        let mut attendees = self.extract_answers(&orders, false).await;
        let Some(attendee) = attendees.pop() else {
            return Ok(WebhookOutcome::Rejected {
                reason: format!("order {} has no positions to invite", payload.code),
            });
        };

        Ok(WebhookOutcome::Accepted {
            organizer: payload.organizer.clone(),
            event: payload.event.clone(),
            attendee,
            item,
            variant,
        })
    }
}
