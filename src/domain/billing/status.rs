//! Local subscription status and the mapping from provider statuses.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Status of a local subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    PastDue,
    Incomplete,
    Unpaid,
}

impl SubscriptionStatus {
    /// Maps a provider status string onto the local status set.
    ///
    /// Trials count as active and `incomplete_expired` collapses into
    /// `Unpaid`. Unrecognized values are logged and treated as active so
    /// a new provider status never locks a paying user out.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "active" | "trialing" => SubscriptionStatus::Active,
            "past_due" => SubscriptionStatus::PastDue,
            "canceled" => SubscriptionStatus::Canceled,
            "incomplete" => SubscriptionStatus::Incomplete,
            "incomplete_expired" | "unpaid" => SubscriptionStatus::Unpaid,
            other => {
                warn!(provider_status = %other, "Unknown provider subscription status, defaulting to ACTIVE");
                SubscriptionStatus::Active
            }
        }
    }

    /// Stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Canceled => "CANCELED",
            SubscriptionStatus::PastDue => "PAST_DUE",
            SubscriptionStatus::Incomplete => "INCOMPLETE",
            SubscriptionStatus::Unpaid => "UNPAID",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(SubscriptionStatus::Active),
            "CANCELED" => Some(SubscriptionStatus::Canceled),
            "PAST_DUE" => Some(SubscriptionStatus::PastDue),
            "INCOMPLETE" => Some(SubscriptionStatus::Incomplete),
            "UNPAID" => Some(SubscriptionStatus::Unpaid),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_known_provider_status() {
        let cases = [
            ("active", SubscriptionStatus::Active),
            ("past_due", SubscriptionStatus::PastDue),
            ("canceled", SubscriptionStatus::Canceled),
            ("incomplete", SubscriptionStatus::Incomplete),
            ("incomplete_expired", SubscriptionStatus::Unpaid),
            ("unpaid", SubscriptionStatus::Unpaid),
            ("trialing", SubscriptionStatus::Active),
        ];
        for (provider, expected) in cases {
            assert_eq!(SubscriptionStatus::from_provider(provider), expected, "{}", provider);
        }
    }

    #[test]
    fn unknown_provider_status_defaults_to_active() {
        assert_eq!(
            SubscriptionStatus::from_provider("paused"),
            SubscriptionStatus::Active
        );
        assert_eq!(SubscriptionStatus::from_provider(""), SubscriptionStatus::Active);
    }

    #[test]
    fn mapping_is_case_sensitive() {
        assert_eq!(
            SubscriptionStatus::from_provider("PAST_DUE"),
            SubscriptionStatus::Active
        );
    }

    #[test]
    fn storage_names_roundtrip() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Incomplete,
            SubscriptionStatus::Unpaid,
        ] {
            assert_eq!(SubscriptionStatus::parse(status.as_str()), Some(status));
        }
    }
}
