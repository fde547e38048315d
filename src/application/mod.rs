//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Webhook deliveries and commands write through a unit of work; queries
//! read through the subscription reader.

pub mod handlers;

pub use handlers::{
    DispatchOutcome, GetSubscriptionStatusHandler, GetSubscriptionStatusQuery,
    ProvisionSubscriptionCommand, ProvisionSubscriptionHandler, ProvisionSubscriptionResult,
    SubscriptionStatusView, WebhookDispatcher,
};
