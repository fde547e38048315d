//! Billing handlers.
//!
//! ## Webhooks
//! - `WebhookDispatcher` routes each provider event to one handler
//! - One handler per event kind, sharing the subscription orchestrator
//!
//! ## Commands
//! - Provisioning the free subscription for a new user
//!
//! ## Queries
//! - Subscription status for the account page

mod checkout_completed;
mod checkout_expired;
mod dispatcher;
mod get_subscription_status;
mod invoice_paid;
mod invoice_payment_failed;
mod invoice_payment_succeeded;
mod orchestrator;
mod provision_subscription;
mod subscription_changed;
mod subscription_deleted;
mod webhook_handler;

#[cfg(test)]
mod test_support;

// Webhooks
pub use checkout_completed::CheckoutCompletedHandler;
pub use checkout_expired::CheckoutExpiredHandler;
pub use dispatcher::{standard_handlers, DispatchOutcome, WebhookDispatcher};
pub use invoice_paid::InvoicePaidHandler;
pub use invoice_payment_failed::InvoicePaymentFailedHandler;
pub use invoice_payment_succeeded::InvoicePaymentSucceededHandler;
pub use orchestrator::{SubscriptionOrchestrator, SyncReport};
pub use subscription_changed::SubscriptionChangedHandler;
pub use subscription_deleted::SubscriptionDeletedHandler;
pub use webhook_handler::WebhookEventHandler;

// Commands
pub use provision_subscription::{
    ProvisionSubscriptionCommand, ProvisionSubscriptionHandler, ProvisionSubscriptionResult,
};

// Queries
pub use get_subscription_status::{
    GetSubscriptionStatusHandler, GetSubscriptionStatusQuery, SubscriptionStatusView,
};
