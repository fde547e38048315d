//! Typed provider objects carried in webhook payloads.
//!
//! Only the fields this crate reads are captured; everything else in the
//! provider's schema is ignored. The `object` field of each payload selects
//! the variant of [`ProviderObject`].

use serde::{Deserialize, Serialize};

/// A hosted checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
}

/// An invoice issued by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    /// Amount paid in minor currency units.
    #[serde(default)]
    pub amount_paid: i64,
    pub currency: String,
}

/// The provider's view of a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSubscription {
    pub id: String,
    pub customer: String,
    /// Required. A payload without a status is rejected at deserialization.
    pub status: String,
    #[serde(default)]
    pub cancel_at_period_end: Option<bool>,
    /// End of the current billing period, epoch seconds.
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: Option<ItemList>,
    #[serde(default)]
    pub discount: Option<ProviderDiscount>,
}

impl ProviderSubscription {
    /// Price id of the first line item, if any.
    pub fn first_price_id(&self) -> Option<&str> {
        self.items
            .as_ref()
            .and_then(|items| items.data.first())
            .and_then(|item| item.price.as_ref())
            .map(|price| price.id.as_str())
    }

    pub fn has_items(&self) -> bool {
        self.items.as_ref().is_some_and(|items| !items.data.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
}

/// Discount applied to a subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDiscount {
    #[serde(default)]
    pub coupon: Option<Coupon>,
    /// Epoch seconds.
    #[serde(default)]
    pub start: Option<i64>,
    /// Epoch seconds.
    #[serde(default)]
    pub end: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub percent_off: Option<f64>,
    /// Minor currency units.
    #[serde(default)]
    pub amount_off: Option<i64>,
    #[serde(default)]
    pub duration_in_months: Option<u32>,
}

/// Any payload object this crate understands, tagged by its `object` field.
///
/// Unknown `object` tags fail to deserialize rather than mapping to a
/// catch-all variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object")]
pub enum ProviderObject {
    #[serde(rename = "checkout.session")]
    Session(CheckoutSession),
    #[serde(rename = "invoice")]
    Invoice(Invoice),
    #[serde(rename = "subscription")]
    Subscription(ProviderSubscription),
}

impl ProviderObject {
    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderObject::Session(_) => CheckoutSession::TYPE_NAME,
            ProviderObject::Invoice(_) => Invoice::TYPE_NAME,
            ProviderObject::Subscription(_) => ProviderSubscription::TYPE_NAME,
        }
    }
}

/// A concrete payload type that can be pulled out of a [`ProviderObject`].
pub trait ProviderPayload: Sized {
    /// Short type name used in diagnostics.
    const TYPE_NAME: &'static str;

    /// Returns the payload when the object is of this type, or hands the
    /// object back unchanged.
    fn from_object(object: ProviderObject) -> Result<Self, ProviderObject>;
}

impl ProviderPayload for CheckoutSession {
    const TYPE_NAME: &'static str = "Session";

    fn from_object(object: ProviderObject) -> Result<Self, ProviderObject> {
        match object {
            ProviderObject::Session(session) => Ok(session),
            other => Err(other),
        }
    }
}

impl ProviderPayload for Invoice {
    const TYPE_NAME: &'static str = "Invoice";

    fn from_object(object: ProviderObject) -> Result<Self, ProviderObject> {
        match object {
            ProviderObject::Invoice(invoice) => Ok(invoice),
            other => Err(other),
        }
    }
}

impl ProviderPayload for ProviderSubscription {
    const TYPE_NAME: &'static str = "Subscription";

    fn from_object(object: ProviderObject) -> Result<Self, ProviderObject> {
        match object {
            ProviderObject::Subscription(subscription) => Ok(subscription),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_tag_selects_variant() {
        let object: ProviderObject = serde_json::from_value(json!({
            "object": "checkout.session",
            "id": "cs_123",
            "customer": "cus_1",
            "subscription": "sub_1"
        }))
        .unwrap();

        assert_eq!(object.type_name(), "Session");
        let session = CheckoutSession::from_object(object).unwrap();
        assert_eq!(session.customer.as_deref(), Some("cus_1"));
    }

    #[test]
    fn subscription_payload_reads_first_price() {
        let object: ProviderObject = serde_json::from_value(json!({
            "object": "subscription",
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "items": { "object": "list", "data": [
                { "id": "si_1", "price": { "id": "price_plus", "unit_amount": 999 } },
                { "id": "si_2", "price": { "id": "price_other" } }
            ]}
        }))
        .unwrap();

        let subscription = ProviderSubscription::from_object(object).unwrap();
        assert!(subscription.has_items());
        assert_eq!(subscription.first_price_id(), Some("price_plus"));
    }

    #[test]
    fn subscription_without_status_is_rejected() {
        let result: Result<ProviderObject, _> = serde_json::from_value(json!({
            "object": "subscription",
            "id": "sub_1",
            "customer": "cus_1"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn unknown_object_tag_is_rejected() {
        let result: Result<ProviderObject, _> = serde_json::from_value(json!({
            "object": "customer",
            "id": "cus_1"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn wrong_variant_is_handed_back() {
        let object = ProviderObject::Invoice(Invoice {
            id: "in_1".to_string(),
            customer: None,
            subscription: None,
            amount_paid: 0,
            currency: "eur".to_string(),
        });

        let returned = CheckoutSession::from_object(object).unwrap_err();
        assert_eq!(returned.type_name(), "Invoice");
    }

    #[test]
    fn empty_item_list_has_no_price() {
        let subscription = ProviderSubscription {
            id: "sub_1".to_string(),
            customer: "cus_1".to_string(),
            status: "active".to_string(),
            cancel_at_period_end: None,
            current_period_end: None,
            items: Some(ItemList { data: vec![] }),
            discount: None,
        };
        assert!(!subscription.has_items());
        assert_eq!(subscription.first_price_id(), None);
    }
}
