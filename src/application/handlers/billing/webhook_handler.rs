//! Handler contract for webhook event kinds.

use async_trait::async_trait;

use crate::domain::billing::{EventEnvelope, EventKind, Subscription, WebhookError};
use crate::ports::BillingStore;

/// Handler for exactly one event kind.
///
/// Handlers run inside the delivery's transaction and must be idempotent:
/// they set absolute values derived from the payload, so a redelivered event
/// leaves the same state as the first delivery.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// The kind this handler processes.
    fn kind(&self) -> EventKind;

    async fn handle(&self, event: &EventEnvelope, store: &mut dyn BillingStore) -> Result<(), WebhookError>;
}

/// Loads the subscription linked to a provider customer, failing if absent.
pub(crate) async fn require_subscription(
    store: &mut dyn BillingStore,
    customer_id: &str,
) -> Result<Subscription, WebhookError> {
    store
        .find_by_provider_customer_id(customer_id)
        .await?
        .ok_or_else(|| WebhookError::SubscriptionNotFound {
            customer_id: customer_id.to_string(),
        })
}
