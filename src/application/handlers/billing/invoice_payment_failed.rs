//! Marks a subscription past due when the provider fails to collect.

use async_trait::async_trait;
use tracing::warn;

use super::webhook_handler::{require_subscription, WebhookEventHandler};
use crate::domain::billing::{EventEnvelope, EventKind, Invoice, PayloadDeserializer, WebhookError};
use crate::ports::BillingStore;

/// Handler for `invoice.payment_failed`: marks the subscription past due.
pub struct InvoicePaymentFailedHandler {
    deserializer: PayloadDeserializer,
}

impl InvoicePaymentFailedHandler {
    pub fn new(deserializer: PayloadDeserializer) -> Self {
        Self { deserializer }
    }
}

#[async_trait]
impl WebhookEventHandler for InvoicePaymentFailedHandler {
    fn kind(&self) -> EventKind {
        EventKind::InvoicePaymentFailed
    }

    async fn handle(&self, event: &EventEnvelope, store: &mut dyn BillingStore) -> Result<(), WebhookError> {
        let invoice: Invoice = self.deserializer.deserialize(event)?;
        let customer_id = invoice
            .customer
            .as_deref()
            .ok_or(WebhookError::MissingField("customer"))?;

        let mut subscription = require_subscription(store, customer_id).await?;
        subscription.mark_past_due();
        store.update(&subscription).await?;

        warn!(
            event_id = %event.id,
            subscription_id = %subscription.id,
            customer_id,
            invoice_id = %invoice.id,
            "Invoice payment failed, subscription is past due"
        );

        Ok(())
    }
}
