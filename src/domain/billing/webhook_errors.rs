//! Webhook processing errors.
//!
//! Errors fall into two groups. Processing errors describe a delivery this
//! crate cannot act on (unknown customer, malformed payload); the provider
//! should not redeliver those. Everything else is a configuration or
//! infrastructure fault that a redelivery may fix.

use http::StatusCode;
use thiserror::Error;

use super::{EventKind, PlanTier};
use crate::domain::foundation::DomainError;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No local subscription carries the event's provider customer id.
    #[error("No subscription found for provider customer: {customer_id}")]
    SubscriptionNotFound { customer_id: String },

    /// Required field missing from the payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The payload object is not of the type the handler expects.
    #[error("Type mismatch for event {event_id}: expected {expected} but got {actual}")]
    TypeMismatch {
        event_id: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The payload could not be read at all.
    #[error("Failed to deserialize {expected} from event {event_id}: {source}")]
    Deserialization {
        event_id: String,
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A recognized kind has no handler. The dispatcher is misconfigured.
    #[error("No handler registered for event type: {kind} (id: {event_id})")]
    HandlerNotRegistered { kind: EventKind, event_id: String },

    /// Two handlers declared the same kind.
    #[error("Handler already registered for event type: {0}")]
    DuplicateHandler(EventKind),

    /// The plan catalog lacks a plan this crate depends on.
    #[error("Plan {0} not found in catalog")]
    CatalogMissingPlan(PlanTier),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true for errors describing the delivery itself.
    ///
    /// These are acknowledged to the provider so it stops redelivering.
    pub fn is_processing_error(&self) -> bool {
        matches!(
            self,
            WebhookError::SubscriptionNotFound { .. }
                | WebhookError::MissingField(_)
                | WebhookError::TypeMismatch { .. }
                | WebhookError::Deserialization { .. }
        )
    }

    /// Maps the error to the status the webhook endpoint should answer with.
    ///
    /// - 200: acknowledged, the provider will not retry
    /// - 500: the provider retries with backoff
    pub fn status_code(&self) -> StatusCode {
        if self.is_processing_error() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
