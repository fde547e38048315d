//! Provider subscription deleted: fall back to the free plan.

use async_trait::async_trait;
use tracing::info;

use super::webhook_handler::{require_subscription, WebhookEventHandler};
use crate::domain::billing::{
    EventEnvelope, EventKind, PayloadDeserializer, PlanTier, ProviderSubscription, WebhookError,
};
use crate::ports::BillingStore;

/// Handler for `customer.subscription.deleted`: resets to the free plan.
pub struct SubscriptionDeletedHandler {
    deserializer: PayloadDeserializer,
}

impl SubscriptionDeletedHandler {
    pub fn new(deserializer: PayloadDeserializer) -> Self {
        Self { deserializer }
    }
}

#[async_trait]
impl WebhookEventHandler for SubscriptionDeletedHandler {
    fn kind(&self) -> EventKind {
        EventKind::SubscriptionDeleted
    }

    async fn handle(&self, event: &EventEnvelope, store: &mut dyn BillingStore) -> Result<(), WebhookError> {
        let external: ProviderSubscription = self.deserializer.deserialize(event)?;
        let mut subscription = require_subscription(store, &external.customer).await?;

        let free_plan = store
            .find_by_tier(PlanTier::Free)
            .await?
            .ok_or(WebhookError::CatalogMissingPlan(PlanTier::Free))?;

        let previous = subscription.plan.tier;
        subscription.reset_to_free(free_plan);
        store.update(&subscription).await?;

        info!(
            event_id = %event.id,
            subscription_id = %subscription.id,
            customer_id = %external.customer,
            from = %previous,
            "Subscription deleted at provider, reset to FREE"
        );

        Ok(())
    }
}
