//! Payload deserializer.
//!
//! Turns an envelope's untyped payload into the concrete provider object a
//! handler asks for. Events rendered with the pinned API version take the
//! checked path; anything else falls back to unchecked parsing, so older or
//! newer payloads keep flowing as long as the fields we read are present.
//!
//! `TypeMismatch` is reserved for payloads that are one of our own provider
//! objects, just not the requested one. An object type outside
//! `ProviderObject` (e.g. `payment_intent`) cannot be read at all and is a
//! `Deserialization` error. Both are acknowledged to the provider.

use tracing::debug;

use super::provider_event::EventEnvelope;
use super::provider_object::ProviderPayload;
use super::WebhookError;

/// API version the typed payloads are written against.
pub const DEFAULT_API_VERSION: &str = "2024-06-20";

#[derive(Debug, Clone)]
pub struct PayloadDeserializer {
    api_version: String,
}

impl PayloadDeserializer {
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
        }
    }

    /// Extracts a payload of type `T` from the event.
    ///
    /// # Errors
    ///
    /// - `TypeMismatch` if the payload is another provider object
    /// - `Deserialization` if neither path can read the payload
    pub fn deserialize<T: ProviderPayload>(&self, event: &EventEnvelope) -> Result<T, WebhookError> {
        let object = match event.object(&self.api_version) {
            Some(object) => object,
            None => {
                debug!(
                    event_id = %event.id,
                    api_version = ?event.api_version,
                    pinned = %self.api_version,
                    "Falling back to unchecked payload deserialization"
                );
                event
                    .object_unchecked()
                    .map_err(|source| WebhookError::Deserialization {
                        event_id: event.id.clone(),
                        expected: T::TYPE_NAME,
                        source,
                    })?
            }
        };

        T::from_object(object).map_err(|actual| WebhookError::TypeMismatch {
            event_id: event.id.clone(),
            expected: T::TYPE_NAME,
            actual: actual.type_name(),
        })
    }
}

impl Default for PayloadDeserializer {
    fn default() -> Self {
        Self::new(DEFAULT_API_VERSION)
    }
}
