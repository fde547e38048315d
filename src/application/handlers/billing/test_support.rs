//! Shared mocks for billing handler tests.

use async_trait::async_trait;

use crate::domain::billing::fixtures::{free_plan, plan};
use crate::domain::billing::{Plan, PlanTier, Subscription};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, UserId};
use crate::ports::{PlanRepository, SubscriptionRepository};

/// Billing store backed by plain vectors, recording every write.
pub struct MockBillingStore {
    pub plans: Vec<Plan>,
    pub subscriptions: Vec<Subscription>,
    pub updates: Vec<Subscription>,
    pub inserts: Vec<Subscription>,
    pub fail_updates: bool,
}

impl MockBillingStore {
    pub fn new() -> Self {
        Self {
            plans: Vec::new(),
            subscriptions: Vec::new(),
            updates: Vec::new(),
            inserts: Vec::new(),
            fail_updates: false,
        }
    }

    /// FREE, PLUS (`price_plus`) and MAX (`price_max`).
    pub fn with_catalog() -> Self {
        let mut store = Self::new();
        store.plans = vec![
            free_plan(),
            plan(PlanTier::Plus, Some("price_plus")),
            plan(PlanTier::Max, Some("price_max")),
        ];
        store
    }

    pub fn plan(&self, tier: PlanTier) -> Plan {
        self.plans
            .iter()
            .find(|p| p.tier == tier)
            .cloned()
            .expect("plan in catalog")
    }

    /// Adds a subscription for `customer_id` on the given tier.
    pub fn with_customer(mut self, customer_id: &str, tier: PlanTier) -> Self {
        let mut sub = Subscription::create_free(SubscriptionId::new(), UserId::new(), self.plan(PlanTier::Free));
        sub.plan = self.plan(tier);
        sub.provider_customer_id = Some(customer_id.to_string());
        self.subscriptions.push(sub);
        self
    }

    pub fn stored(&self, customer_id: &str) -> Subscription {
        self.subscriptions
            .iter()
            .find(|s| s.provider_customer_id.as_deref() == Some(customer_id))
            .cloned()
            .expect("subscription for customer")
    }

    pub fn stored_mut(&mut self, customer_id: &str) -> &mut Subscription {
        self.subscriptions
            .iter_mut()
            .find(|s| s.provider_customer_id.as_deref() == Some(customer_id))
            .expect("subscription for customer")
    }
}

#[async_trait]
impl SubscriptionRepository for MockBillingStore {
    async fn find_by_provider_customer_id(
        &mut self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .subscriptions
            .iter()
            .find(|s| s.provider_customer_id.as_deref() == Some(customer_id))
            .cloned())
    }

    async fn find_by_user_id(&mut self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.subscriptions.iter().find(|s| &s.user_id == user_id).cloned())
    }

    async fn insert(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        self.inserts.push(subscription.clone());
        self.subscriptions.push(subscription.clone());
        Ok(())
    }

    async fn update(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        if self.fail_updates {
            return Err(DomainError::new(ErrorCode::DatabaseError, "update failed"));
        }
        self.updates.push(subscription.clone());
        if let Some(s) = self.subscriptions.iter_mut().find(|s| s.id == subscription.id) {
            *s = subscription.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl PlanRepository for MockBillingStore {
    async fn find_by_tier(&mut self, tier: PlanTier) -> Result<Option<Plan>, DomainError> {
        Ok(self.plans.iter().find(|p| p.tier == tier).cloned())
    }

    async fn find_by_provider_price_id(&mut self, price_id: &str) -> Result<Option<Plan>, DomainError> {
        Ok(self
            .plans
            .iter()
            .find(|p| p.provider_price_id.as_deref() == Some(price_id))
            .cloned())
    }
}
