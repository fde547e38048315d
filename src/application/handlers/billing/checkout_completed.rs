//! Links a provider subscription after a successful checkout.

use async_trait::async_trait;
use tracing::{debug, info};

use super::webhook_handler::{require_subscription, WebhookEventHandler};
use crate::domain::billing::{
    CheckoutSession, EventEnvelope, EventKind, PayloadDeserializer, WebhookError,
};
use crate::ports::BillingStore;

/// Handler for `checkout.session.completed`: links the provider subscription.
pub struct CheckoutCompletedHandler {
    deserializer: PayloadDeserializer,
}

impl CheckoutCompletedHandler {
    pub fn new(deserializer: PayloadDeserializer) -> Self {
        Self { deserializer }
    }
}

#[async_trait]
impl WebhookEventHandler for CheckoutCompletedHandler {
    fn kind(&self) -> EventKind {
        EventKind::CheckoutCompleted
    }

    async fn handle(&self, event: &EventEnvelope, store: &mut dyn BillingStore) -> Result<(), WebhookError> {
        let session: CheckoutSession = self.deserializer.deserialize(event)?;
        let customer_id = session
            .customer
            .as_deref()
            .ok_or(WebhookError::MissingField("customer"))?;

        info!(event_id = %event.id, customer_id, session_id = %session.id, "Checkout completed");

        let mut subscription = require_subscription(store, customer_id).await?;

        if subscription.link_provider_subscription(session.subscription.clone()) {
            store.update(&subscription).await?;
            info!(
                subscription_id = %subscription.id,
                provider_subscription_id = ?subscription.provider_subscription_id,
                "Provider subscription linked"
            );
        } else {
            debug!(
                subscription_id = %subscription.id,
                "Subscription already linked, leaving it unchanged"
            );
        }

        Ok(())
    }
}
