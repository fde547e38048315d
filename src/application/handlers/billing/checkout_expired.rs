//! Records abandoned checkouts. Nothing is mutated.

use async_trait::async_trait;
use tracing::warn;

use super::webhook_handler::WebhookEventHandler;
use crate::domain::billing::{
    CheckoutSession, EventEnvelope, EventKind, PayloadDeserializer, WebhookError,
};
use crate::ports::BillingStore;

/// Handler for `checkout.session.expired`. Logs only.
pub struct CheckoutExpiredHandler {
    deserializer: PayloadDeserializer,
}

impl CheckoutExpiredHandler {
    pub fn new(deserializer: PayloadDeserializer) -> Self {
        Self { deserializer }
    }
}

#[async_trait]
impl WebhookEventHandler for CheckoutExpiredHandler {
    fn kind(&self) -> EventKind {
        EventKind::CheckoutExpired
    }

    async fn handle(&self, event: &EventEnvelope, _store: &mut dyn BillingStore) -> Result<(), WebhookError> {
        let session: CheckoutSession = self.deserializer.deserialize(event)?;

        warn!(
            event_id = %event.id,
            customer_id = ?session.customer,
            session_id = %session.id,
            "Checkout session expired"
        );

        Ok(())
    }
}
