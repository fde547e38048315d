//! WebhookDispatcher - Routes provider events to their handler.
//!
//! The routing table is built once from a fixed handler list. Each delivery
//! runs in its own transaction:
//!
//! 1. Resolve the raw type string to an `EventKind` (unknown strings are
//!    acknowledged as skipped without opening a transaction)
//! 2. Look up the single handler registered for that kind
//! 3. Begin a transaction, run the handler, commit on success or roll back
//!    on any error

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::checkout_completed::CheckoutCompletedHandler;
use super::checkout_expired::CheckoutExpiredHandler;
use super::invoice_paid::InvoicePaidHandler;
use super::invoice_payment_failed::InvoicePaymentFailedHandler;
use super::invoice_payment_succeeded::InvoicePaymentSucceededHandler;
use super::subscription_changed::SubscriptionChangedHandler;
use super::subscription_deleted::SubscriptionDeletedHandler;
use super::webhook_handler::WebhookEventHandler;
use crate::domain::billing::{EventEnvelope, EventKind, PayloadDeserializer, WebhookError};
use crate::ports::BillingUnitOfWork;

/// Result of a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler for this kind ran and its changes were committed.
    Handled(EventKind),
    /// The event type is not one this crate acts on.
    Skipped,
}

/// One handler per event kind, covering every kind.
pub fn standard_handlers(deserializer: PayloadDeserializer) -> Vec<Arc<dyn WebhookEventHandler>> {
    vec![
        Arc::new(CheckoutCompletedHandler::new(deserializer.clone())),
        Arc::new(CheckoutExpiredHandler::new(deserializer.clone())),
        Arc::new(InvoicePaidHandler::new(deserializer.clone())),
        Arc::new(InvoicePaymentFailedHandler::new(deserializer.clone())),
        Arc::new(InvoicePaymentSucceededHandler::new(deserializer.clone())),
        Arc::new(SubscriptionChangedHandler::created(deserializer.clone())),
        Arc::new(SubscriptionChangedHandler::updated(deserializer.clone())),
        Arc::new(SubscriptionDeletedHandler::new(deserializer)),
    ]
}

/// Routes each delivery to the handler registered for its kind.
pub struct WebhookDispatcher {
    handlers: HashMap<EventKind, Arc<dyn WebhookEventHandler>>,
    unit_of_work: Arc<dyn BillingUnitOfWork>,
}

impl WebhookDispatcher {
    /// Builds the routing table.
    ///
    /// # Errors
    ///
    /// - `DuplicateHandler` if two handlers declare the same kind
    pub fn new(
        unit_of_work: Arc<dyn BillingUnitOfWork>,
        handlers: Vec<Arc<dyn WebhookEventHandler>>,
    ) -> Result<Self, WebhookError> {
        let mut table = HashMap::with_capacity(handlers.len());
        for handler in handlers {
            let kind = handler.kind();
            if table.insert(kind, handler).is_some() {
                return Err(WebhookError::DuplicateHandler(kind));
            }
        }

        let missing: Vec<_> = EventKind::ALL
            .iter()
            .filter(|kind| !table.contains_key(*kind))
            .map(EventKind::as_str)
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "Dispatcher built without handlers for some event kinds");
        }

        Ok(Self {
            handlers: table,
            unit_of_work,
        })
    }

    /// Dispatcher wired with [`standard_handlers`].
    pub fn with_standard_handlers(
        unit_of_work: Arc<dyn BillingUnitOfWork>,
        deserializer: PayloadDeserializer,
    ) -> Result<Self, WebhookError> {
        Self::new(unit_of_work, standard_handlers(deserializer))
    }

    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Processes one delivery.
    ///
    /// # Errors
    ///
    /// - `HandlerNotRegistered` if the kind is known but nothing handles it
    /// - any error returned by the handler, after the transaction is rolled back
    /// - `Database` if the transaction cannot be opened or committed
    pub async fn handle(&self, event: &EventEnvelope) -> Result<DispatchOutcome, WebhookError> {
        let Some(kind) = event.kind() else {
            debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring unhandled event type");
            return Ok(DispatchOutcome::Skipped);
        };

        let handler = self.handlers.get(&kind).ok_or_else(|| {
            error!(event_id = %event.id, %kind, "No handler registered for event kind");
            WebhookError::HandlerNotRegistered {
                kind,
                event_id: event.id.clone(),
            }
        })?;

        debug!(event_id = %event.id, %kind, "Dispatching event");

        let mut tx = self.unit_of_work.begin().await?;
        let result = handler.handle(event, tx.as_store()).await;
        match result {
            Ok(()) => {
                tx.commit().await?;
                info!(event_id = %event.id, %kind, "Event processed");
                Ok(DispatchOutcome::Handled(kind))
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(event_id = %event.id, error = %rollback_err, "Rollback failed");
                }
                if err.is_processing_error() {
                    warn!(event_id = %event.id, %kind, error = %err, "Event could not be processed");
                } else {
                    error!(event_id = %event.id, %kind, error = %err, "Event processing failed");
                }
                Err(err)
            }
        }
    }
}
