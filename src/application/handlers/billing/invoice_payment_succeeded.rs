//! Clears a past-due status once a payment goes through.

use async_trait::async_trait;
use tracing::{debug, info};

use super::webhook_handler::{require_subscription, WebhookEventHandler};
use crate::domain::billing::{EventEnvelope, EventKind, Invoice, PayloadDeserializer, WebhookError};
use crate::ports::BillingStore;

/// Handler for `invoice.payment_succeeded`: recovers a past-due subscription.
pub struct InvoicePaymentSucceededHandler {
    deserializer: PayloadDeserializer,
}

impl InvoicePaymentSucceededHandler {
    pub fn new(deserializer: PayloadDeserializer) -> Self {
        Self { deserializer }
    }
}

#[async_trait]
impl WebhookEventHandler for InvoicePaymentSucceededHandler {
    fn kind(&self) -> EventKind {
        EventKind::InvoicePaymentSucceeded
    }

    async fn handle(&self, event: &EventEnvelope, store: &mut dyn BillingStore) -> Result<(), WebhookError> {
        let invoice: Invoice = self.deserializer.deserialize(event)?;
        let customer_id = invoice
            .customer
            .as_deref()
            .ok_or(WebhookError::MissingField("customer"))?;

        let mut subscription = require_subscription(store, customer_id).await?;

        if subscription.recover_payment() {
            store.update(&subscription).await?;
            info!(
                event_id = %event.id,
                subscription_id = %subscription.id,
                "Payment recovered, subscription active again"
            );
        } else {
            debug!(
                subscription_id = %subscription.id,
                status = %subscription.status,
                "Payment succeeded, nothing to recover"
            );
        }

        Ok(())
    }
}
