//! Application handlers.
//!
//! Command, query and webhook handlers that orchestrate domain operations.

pub mod billing;

pub use billing::{
    DispatchOutcome, GetSubscriptionStatusHandler, GetSubscriptionStatusQuery,
    ProvisionSubscriptionCommand, ProvisionSubscriptionHandler, ProvisionSubscriptionResult,
    SubscriptionStatusView, WebhookDispatcher, WebhookEventHandler,
};
