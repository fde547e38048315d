//! Billing domain - subscriptions, plans and provider payloads.
//!
//! # Module Organization
//!
//! - `plan` - Catalog plans and tiers
//! - `subscription` - Subscription aggregate
//! - `status` - Local status and provider status mapping
//! - `discount` - Discount snapshots derived from provider payloads
//! - `provider_event` - Webhook envelope and event kinds
//! - `provider_object` - Typed provider payload objects
//! - `payload` - Payload deserializer with type checking
//! - `webhook_errors` - Webhook processing errors

mod discount;
mod payload;
mod plan;
mod provider_event;
mod provider_object;
mod status;
mod subscription;
mod webhook_errors;

pub use discount::{DiscountKind, DiscountSnapshot};
pub use payload::{PayloadDeserializer, DEFAULT_API_VERSION};
pub use plan::{Plan, PlanTier};
pub use provider_event::{EventData, EventEnvelope, EventKind};
pub use provider_object::{
    CheckoutSession, Coupon, Invoice, ItemList, Price, ProviderDiscount, ProviderObject,
    ProviderPayload, ProviderSubscription, SubscriptionItem,
};
pub use status::SubscriptionStatus;
pub use subscription::{InvoiceAmount, Subscription};
pub use webhook_errors::WebhookError;

#[cfg(test)]
pub(crate) use plan::fixtures;
#[cfg(test)]
pub(crate) use provider_event::EventEnvelopeBuilder;
