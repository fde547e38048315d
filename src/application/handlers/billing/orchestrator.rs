//! SubscriptionOrchestrator - Applies the provider's subscription state locally.
//!
//! Shared by the created and updated handlers. Every field is overwritten
//! with the payload's value, so applying the same payload twice yields the
//! same record.

use tracing::{debug, info, warn};

use crate::domain::billing::{
    DiscountSnapshot, ProviderSubscription, Subscription, SubscriptionStatus, WebhookError,
};
use crate::domain::foundation::Timestamp;
use crate::ports::BillingStore;

/// Outcome of one synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub plan_changed: bool,
    /// Discount currently reported by the provider. Not persisted.
    pub discount: Option<DiscountSnapshot>,
}

/// Applies a provider subscription to the local record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubscriptionOrchestrator;

impl SubscriptionOrchestrator {
    pub fn new() -> Self {
        Self
    }

    /// Copies status, cancellation flag, period end and plan from the
    /// provider subscription, then persists once.
    pub async fn synchronize(
        &self,
        store: &mut dyn BillingStore,
        subscription: &mut Subscription,
        external: &ProviderSubscription,
    ) -> Result<SyncReport, WebhookError> {
        subscription.provider_subscription_id = Some(external.id.clone());
        subscription.status = SubscriptionStatus::from_provider(&external.status);
        subscription.cancel_at_period_end = external.cancel_at_period_end.unwrap_or(false);

        if let Some(period_end) = external.current_period_end {
            match Timestamp::from_epoch_secs(period_end) {
                Some(ts) => subscription.current_period_end = Some(ts),
                None => warn!(
                    provider_subscription_id = %external.id,
                    period_end,
                    "Ignoring unrepresentable current_period_end"
                ),
            }
        }

        let plan_changed = self.resolve_plan(store, subscription, external).await?;

        subscription.touch();
        store.update(subscription).await?;

        let discount = DiscountSnapshot::extract(external.discount.as_ref());
        if let Some(discount) = &discount {
            debug!(
                provider_subscription_id = %external.id,
                coupon_id = %discount.coupon_id,
                kind = discount.kind.as_str(),
                value = discount.value,
                "Provider reports active discount"
            );
        }

        info!(
            subscription_id = %subscription.id,
            provider_subscription_id = %external.id,
            status = %subscription.status,
            plan = %subscription.plan.tier,
            plan_changed,
            "Subscription synchronized"
        );

        Ok(SyncReport {
            plan_changed,
            discount,
        })
    }

    /// Switches to the plan of the first line item's price. Missing items or
    /// unknown prices leave the current plan in place.
    async fn resolve_plan(
        &self,
        store: &mut dyn BillingStore,
        subscription: &mut Subscription,
        external: &ProviderSubscription,
    ) -> Result<bool, WebhookError> {
        let Some(price_id) = external.first_price_id() else {
            if external.has_items() {
                warn!(provider_subscription_id = %external.id, "First subscription item has no price");
            } else {
                warn!(provider_subscription_id = %external.id, "Subscription has no items");
            }
            return Ok(false);
        };

        match store.find_by_provider_price_id(price_id).await? {
            Some(plan) => {
                let previous = subscription.plan.tier;
                let changed = subscription.change_plan(plan);
                if changed {
                    info!(
                        subscription_id = %subscription.id,
                        from = %previous,
                        to = %subscription.plan.tier,
                        "Plan changed"
                    );
                }
                Ok(changed)
            }
            None => {
                warn!(price_id, "No plan found for provider price id");
                Ok(false)
            }
        }
    }
}
