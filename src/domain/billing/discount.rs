//! Discount snapshots derived from provider payloads.
//!
//! Discounts are never tracked as a ledger. Each event carries the
//! provider's current discount, which is turned into a snapshot on demand.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::provider_object::ProviderDiscount;
use crate::domain::foundation::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percentage,
    Amount,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "PERCENTAGE",
            DiscountKind::Amount => "AMOUNT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PERCENTAGE" => Some(DiscountKind::Percentage),
            "AMOUNT" => Some(DiscountKind::Amount),
            _ => None,
        }
    }
}

/// A discount as a single unit: either all of it is known or none of it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSnapshot {
    pub coupon_id: String,
    pub kind: DiscountKind,
    /// Percent for `Percentage`, major currency units for `Amount`.
    pub value: f64,
    /// `None` for a permanent discount.
    pub ends_at: Option<Timestamp>,
}

impl DiscountSnapshot {
    /// Builds a snapshot from the provider's discount.
    ///
    /// Returns `None` when there is no discount, no coupon, no coupon id, or
    /// a coupon with neither a percentage nor an amount.
    pub fn extract(discount: Option<&ProviderDiscount>) -> Option<Self> {
        let discount = discount?;
        let coupon = discount.coupon.as_ref()?;
        let Some(coupon_id) = coupon.id.clone() else {
            warn!("Discount coupon has no id, ignoring discount");
            return None;
        };

        let (kind, value) = match (coupon.percent_off, coupon.amount_off) {
            (Some(percent), _) => (DiscountKind::Percentage, percent),
            (None, Some(cents)) => (DiscountKind::Amount, cents as f64 / 100.0),
            (None, None) => {
                warn!(coupon_id = %coupon_id, "Coupon has neither percent_off nor amount_off, ignoring discount");
                return None;
            }
        };

        let ends_at = match (discount.start, coupon.duration_in_months) {
            (Some(start), Some(months)) => {
                Timestamp::from_epoch_secs(start).and_then(|start| start.plus_months(months))
            }
            _ => discount.end.and_then(Timestamp::from_epoch_secs),
        };

        Some(Self {
            coupon_id,
            kind,
            value,
            ends_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(&Timestamp::now())
    }

    /// True iff an end is known and lies strictly before `now`.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        self.ends_at.is_some_and(|end| end.is_before(now))
    }
}
