//! Subscription aggregate.
//!
//! The local record of what a user is entitled to. Every user gets exactly
//! one, created on the free plan at registration. Afterwards it is only ever
//! changed by provider events, and never deleted: a provider-side deletion
//! resets it to the free plan.
//!
//! # Design Decisions
//!
//! - **Join key**: `provider_customer_id` links provider events to the record
//! - **Absolute writes**: mutators set values, never increment, so redelivered
//!   events converge on the same state
//! - **Money in minor units**: invoice amounts are stored as i64 cents

use serde::{Deserialize, Serialize};

use super::{DiscountSnapshot, Plan, SubscriptionStatus};
use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};

/// Last invoice amount recorded from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAmount {
    /// Minor currency units.
    pub amount_cents: i64,
    pub currency: String,
}

/// Subscription aggregate.
///
/// # Invariants
///
/// - `user_id` is unique (one subscription per user)
/// - references exactly one plan
/// - the discount is stored as one unit or not at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan: Plan,
    pub provider_customer_id: Option<String>,
    pub provider_subscription_id: Option<String>,
    pub status: SubscriptionStatus,
    pub cancel_at_period_end: bool,
    pub current_period_end: Option<Timestamp>,
    pub discount: Option<DiscountSnapshot>,
    pub last_invoice: Option<InvoiceAmount>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Creates the initial free subscription for a user.
    pub fn create_free(id: SubscriptionId, user_id: UserId, free_plan: Plan) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            plan: free_plan,
            provider_customer_id: None,
            provider_subscription_id: None,
            status: SubscriptionStatus::Active,
            cancel_at_period_end: false,
            current_period_end: None,
            discount: None,
            last_invoice: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once a checkout has tied a provider subscription to this record.
    pub fn is_linked(&self) -> bool {
        self.provider_subscription_id.is_some()
    }

    /// Links a provider subscription after checkout.
    ///
    /// An existing link is never overwritten; returns false in that case.
    pub fn link_provider_subscription(&mut self, provider_subscription_id: Option<String>) -> bool {
        if self.is_linked() {
            return false;
        }
        self.provider_subscription_id = provider_subscription_id;
        self.status = SubscriptionStatus::Active;
        self.touch();
        true
    }

    pub fn mark_past_due(&mut self) {
        self.status = SubscriptionStatus::PastDue;
        self.touch();
    }

    /// Clears a past-due status after a successful payment.
    ///
    /// Returns false, leaving the record untouched, for any other status.
    pub fn recover_payment(&mut self) -> bool {
        if self.status != SubscriptionStatus::PastDue {
            return false;
        }
        self.status = SubscriptionStatus::Active;
        self.touch();
        true
    }

    pub fn record_invoice(&mut self, amount_cents: i64, currency: impl Into<String>) {
        self.last_invoice = Some(InvoiceAmount {
            amount_cents,
            currency: currency.into(),
        });
        self.touch();
    }

    /// Switches to another plan. Returns false when it is already current.
    pub fn change_plan(&mut self, plan: Plan) -> bool {
        if self.plan.is_same_plan(&plan) {
            return false;
        }
        self.plan = plan;
        self.touch();
        true
    }

    pub fn clear_discount(&mut self) {
        self.discount = None;
    }

    /// Returns the record to the free plan after the provider deleted it.
    pub fn reset_to_free(&mut self, free_plan: Plan) {
        self.plan = free_plan;
        self.provider_customer_id = None;
        self.provider_subscription_id = None;
        self.status = SubscriptionStatus::Active;
        self.cancel_at_period_end = false;
        self.current_period_end = None;
        self.clear_discount();
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}
