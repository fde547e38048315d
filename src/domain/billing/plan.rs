//! Catalog plans.
//!
//! Plans are reference data: this crate reads them to resolve provider
//! price ids and to fall back to the free tier, but never writes them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{PlanId, Timestamp};

/// Tier of a catalog plan. Exactly one plan exists per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanTier {
    Free,
    Plus,
    Max,
}

impl PlanTier {
    /// Stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "FREE",
            PlanTier::Plus => "PLUS",
            PlanTier::Max => "MAX",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FREE" => Some(PlanTier::Free),
            "PLUS" => Some(PlanTier::Plus),
            "MAX" => Some(PlanTier::Max),
            _ => None,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A purchasable (or free) plan from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub tier: PlanTier,
    pub monthly_token_limit: i32,
    pub daily_message_limit: i32,
    /// Price in minor currency units.
    pub price_cents: i64,
    /// ISO 4217 code.
    pub currency: String,
    /// Provider price id; `None` only for the free plan.
    pub provider_price_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Plan {
    /// Plans are identified by id; two snapshots of the same row are the same plan.
    pub fn is_same_plan(&self, other: &Plan) -> bool {
        self.id == other.id
    }
}
