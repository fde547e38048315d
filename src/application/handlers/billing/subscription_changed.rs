//! Provider subscription created or updated.
//!
//! Both kinds carry the full subscription object and are handled alike:
//! look up the local record and let the orchestrator copy the state over.

use async_trait::async_trait;
use tracing::info;

use super::orchestrator::SubscriptionOrchestrator;
use super::webhook_handler::{require_subscription, WebhookEventHandler};
use crate::domain::billing::{
    EventEnvelope, EventKind, PayloadDeserializer, ProviderSubscription, WebhookError,
};
use crate::ports::BillingStore;

/// Handler for `customer.subscription.created` and `.updated`.
pub struct SubscriptionChangedHandler {
    kind: EventKind,
    deserializer: PayloadDeserializer,
    orchestrator: SubscriptionOrchestrator,
}

impl SubscriptionChangedHandler {
    /// Handler for `customer.subscription.created`.
    pub fn created(deserializer: PayloadDeserializer) -> Self {
        Self {
            kind: EventKind::SubscriptionCreated,
            deserializer,
            orchestrator: SubscriptionOrchestrator::new(),
        }
    }

    /// Handler for `customer.subscription.updated`.
    pub fn updated(deserializer: PayloadDeserializer) -> Self {
        Self {
            kind: EventKind::SubscriptionUpdated,
            deserializer,
            orchestrator: SubscriptionOrchestrator::new(),
        }
    }
}

#[async_trait]
impl WebhookEventHandler for SubscriptionChangedHandler {
    fn kind(&self) -> EventKind {
        self.kind
    }

    async fn handle(&self, event: &EventEnvelope, store: &mut dyn BillingStore) -> Result<(), WebhookError> {
        let external: ProviderSubscription = self.deserializer.deserialize(event)?;

        info!(
            event_id = %event.id,
            kind = %self.kind,
            customer_id = %external.customer,
            provider_subscription_id = %external.id,
            "Subscription changed at provider"
        );

        let mut subscription = require_subscription(store, &external.customer).await?;
        self.orchestrator
            .synchronize(store, &mut subscription, &external)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::MockBillingStore;
    use crate::domain::billing::{EventEnvelopeBuilder, PlanTier, Subscription, SubscriptionStatus};
    use serde_json::json;

    fn event(kind: EventKind, customer: &str, status: &str, price: &str) -> EventEnvelope {
        EventEnvelopeBuilder::new()
            .kind(kind)
            .object(json!({
                "object": "subscription",
                "id": "sub_1",
                "customer": customer,
                "status": status,
                "cancel_at_period_end": false,
                "current_period_end": 1_800_000_000,
                "items": { "object": "list", "data": [ { "id": "si_1", "price": { "id": price } } ] }
            }))
            .build()
    }

    #[test]
    fn constructors_declare_their_kind() {
        let d = PayloadDeserializer::default();
        assert_eq!(SubscriptionChangedHandler::created(d.clone()).kind(), EventKind::SubscriptionCreated);
        assert_eq!(SubscriptionChangedHandler::updated(d).kind(), EventKind::SubscriptionUpdated);
    }

    #[tokio::test]
    async fn created_upgrades_plan() {
        let mut store = MockBillingStore::with_catalog().with_customer("cus_1", PlanTier::Free);

        SubscriptionChangedHandler::created(PayloadDeserializer::default())
            .handle(&event(EventKind::SubscriptionCreated, "cus_1", "active", "price_max"), &mut store)
            .await
            .unwrap();

        let saved = store.stored("cus_1");
        assert_eq!(saved.plan.tier, PlanTier::Max);
        assert_eq!(saved.provider_subscription_id.as_deref(), Some("sub_1"));
    }

    #[tokio::test]
    async fn updated_redelivery_is_idempotent() {
        let mut store = MockBillingStore::with_catalog().with_customer("cus_1", PlanTier::Free);
        let handler = SubscriptionChangedHandler::updated(PayloadDeserializer::default());
        let event = event(EventKind::SubscriptionUpdated, "cus_1", "past_due", "price_plus");

        handler.handle(&event, &mut store).await.unwrap();
        let first = store.stored("cus_1");
        handler.handle(&event, &mut store).await.unwrap();
        let second = store.stored("cus_1");

        assert_eq!(second.status, SubscriptionStatus::PastDue);
        assert_eq!(second.plan.tier, PlanTier::Plus);
        let first_at_same_time = Subscription {
            updated_at: second.updated_at,
            ..first
        };
        assert_eq!(first_at_same_time, second);
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let mut store = MockBillingStore::with_catalog();

        let err = SubscriptionChangedHandler::updated(PayloadDeserializer::default())
            .handle(&event(EventKind::SubscriptionUpdated, "cus_x", "active", "price_plus"), &mut store)
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::SubscriptionNotFound { .. }));
    }
}
