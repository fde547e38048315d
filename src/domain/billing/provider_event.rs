//! Provider webhook envelopes and the closed set of event kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::provider_object::ProviderObject;

/// A webhook delivery as sent by the billing provider.
///
/// The payload object stays untyped until a handler asks for a concrete
/// type through the payload deserializer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventEnvelope {
    /// Provider event id (evt_xxx).
    pub id: String,

    /// Raw event type string, e.g. "invoice.paid".
    #[serde(rename = "type")]
    pub event_type: String,

    /// Creation time, epoch seconds.
    #[serde(default)]
    pub created: i64,

    /// API version the payload was rendered with.
    #[serde(default)]
    pub api_version: Option<String>,

    #[serde(default)]
    pub livemode: bool,

    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventData {
    pub object: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl EventEnvelope {
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        api_version: Option<String>,
        object: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            created: chrono::Utc::now().timestamp(),
            api_version,
            livemode: false,
            data: EventData {
                object,
                previous_attributes: None,
            },
        }
    }

    /// Resolves the raw type string; `None` for kinds this crate ignores.
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::parse(&self.event_type)
    }

    /// Typed payload, available only when the event was rendered with the
    /// pinned API version and the payload parses.
    pub fn object(&self, pinned_api_version: &str) -> Option<ProviderObject> {
        if self.api_version.as_deref() != Some(pinned_api_version) {
            return None;
        }
        serde_json::from_value(self.data.object.clone()).ok()
    }

    /// Typed payload regardless of API version.
    pub fn object_unchecked(&self) -> Result<ProviderObject, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// Event kinds that drive subscription synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    CheckoutCompleted,
    CheckoutExpired,
    InvoicePaid,
    InvoicePaymentFailed,
    InvoicePaymentSucceeded,
    SubscriptionCreated,
    SubscriptionUpdated,
    SubscriptionDeleted,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::CheckoutCompleted,
        EventKind::CheckoutExpired,
        EventKind::InvoicePaid,
        EventKind::InvoicePaymentFailed,
        EventKind::InvoicePaymentSucceeded,
        EventKind::SubscriptionCreated,
        EventKind::SubscriptionUpdated,
        EventKind::SubscriptionDeleted,
    ];

    /// Parses a provider type string. Accepts the provider's wire names and
    /// their short aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "checkout.session.completed" | "checkout.completed" => Some(Self::CheckoutCompleted),
            "checkout.session.expired" | "checkout.expired" => Some(Self::CheckoutExpired),
            "invoice.paid" => Some(Self::InvoicePaid),
            "invoice.payment_failed" => Some(Self::InvoicePaymentFailed),
            "invoice.payment_succeeded" => Some(Self::InvoicePaymentSucceeded),
            "customer.subscription.created" | "subscription.created" => {
                Some(Self::SubscriptionCreated)
            }
            "customer.subscription.updated" | "subscription.updated" => {
                Some(Self::SubscriptionUpdated)
            }
            "customer.subscription.deleted" | "subscription.deleted" => {
                Some(Self::SubscriptionDeleted)
            }
            _ => None,
        }
    }

    /// The provider's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutCompleted => "checkout.session.completed",
            Self::CheckoutExpired => "checkout.session.expired",
            Self::InvoicePaid => "invoice.paid",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            Self::SubscriptionCreated => "customer.subscription.created",
            Self::SubscriptionUpdated => "customer.subscription.updated",
            Self::SubscriptionDeleted => "customer.subscription.deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder for test envelopes.
#[cfg(test)]
pub struct EventEnvelopeBuilder {
    id: String,
    event_type: String,
    api_version: Option<String>,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for EventEnvelopeBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            api_version: Some("2024-06-20".to_string()),
            object: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
impl EventEnvelopeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn kind(mut self, kind: EventKind) -> Self {
        self.event_type = kind.as_str().to_string();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn api_version(mut self, version: Option<&str>) -> Self {
        self.api_version = version.map(String::from);
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> EventEnvelope {
        EventEnvelope::new(self.id, self.event_type, self.api_version, self.object)
    }
}
