//! Records the amount of each paid invoice.
//!
//! Invoices may arrive for customers this system never linked (one-off
//! purchases, customers created directly at the provider). Those are logged
//! and skipped rather than failed.

use async_trait::async_trait;
use tracing::{info, warn};

use super::webhook_handler::WebhookEventHandler;
use crate::domain::billing::{EventEnvelope, EventKind, Invoice, PayloadDeserializer, WebhookError};
use crate::ports::BillingStore;

/// Handler for `invoice.paid`: records the latest paid amount.
pub struct InvoicePaidHandler {
    deserializer: PayloadDeserializer,
}

impl InvoicePaidHandler {
    pub fn new(deserializer: PayloadDeserializer) -> Self {
        Self { deserializer }
    }
}

#[async_trait]
impl WebhookEventHandler for InvoicePaidHandler {
    fn kind(&self) -> EventKind {
        EventKind::InvoicePaid
    }

    async fn handle(&self, event: &EventEnvelope, store: &mut dyn BillingStore) -> Result<(), WebhookError> {
        let invoice: Invoice = self.deserializer.deserialize(event)?;

        let Some(customer_id) = invoice.customer.as_deref() else {
            warn!(event_id = %event.id, invoice_id = %invoice.id, "Paid invoice has no customer");
            return Ok(());
        };

        let Some(mut subscription) = store.find_by_provider_customer_id(customer_id).await? else {
            warn!(
                event_id = %event.id,
                customer_id,
                invoice_id = %invoice.id,
                "No subscription found for provider customer, skipping paid invoice"
            );
            return Ok(());
        };

        subscription.record_invoice(invoice.amount_paid, invoice.currency.clone());
        store.update(&subscription).await?;

        info!(
            subscription_id = %subscription.id,
            invoice_id = %invoice.id,
            amount_cents = invoice.amount_paid,
            currency = %invoice.currency,
            "Invoice paid"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::MockBillingStore;
    use crate::domain::billing::{EventEnvelopeBuilder, InvoiceAmount, PlanTier};
    use serde_json::json;

    fn event(customer: Option<&str>, amount: i64) -> EventEnvelope {
        EventEnvelopeBuilder::new()
            .kind(EventKind::InvoicePaid)
            .object(json!({
                "object": "invoice",
                "id": "in_1",
                "customer": customer,
                "amount_paid": amount,
                "currency": "eur"
            }))
            .build()
    }

    #[tokio::test]
    async fn records_amount_and_currency() {
        let mut store = MockBillingStore::with_catalog().with_customer("cus_1", PlanTier::Plus);

        InvoicePaidHandler::new(PayloadDeserializer::default())
            .handle(&event(Some("cus_1"), 999), &mut store)
            .await
            .unwrap();

        assert_eq!(
            store.stored("cus_1").last_invoice,
            Some(InvoiceAmount {
                amount_cents: 999,
                currency: "eur".to_string()
            })
        );
    }

    #[tokio::test]
    async fn unknown_customer_is_skipped() {
        let mut store = MockBillingStore::with_catalog();

        InvoicePaidHandler::new(PayloadDeserializer::default())
            .handle(&event(Some("cus_unknown"), 999), &mut store)
            .await
            .unwrap();

        assert!(store.updates.is_empty());
    }

    #[tokio::test]
    async fn invoice_without_customer_is_skipped() {
        let mut store = MockBillingStore::with_catalog();

        InvoicePaidHandler::new(PayloadDeserializer::default())
            .handle(&event(None, 999), &mut store)
            .await
            .unwrap();

        assert!(store.updates.is_empty());
    }
}
