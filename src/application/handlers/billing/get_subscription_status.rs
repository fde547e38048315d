//! GetSubscriptionStatusHandler - Query handler for a user's subscription.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::billing::{DiscountSnapshot, PlanTier, Subscription, SubscriptionStatus};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::ports::SubscriptionReader;

#[derive(Debug, Clone)]
pub struct GetSubscriptionStatusQuery {
    pub user_id: UserId,
}

/// What the account page shows about a subscription.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionStatusView {
    pub subscription_id: SubscriptionId,
    pub plan: PlanTier,
    pub monthly_token_limit: i32,
    pub daily_message_limit: i32,
    pub price_cents: i64,
    pub currency: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub has_provider_subscription: bool,
    /// Only present while the discount is still running.
    pub discount: Option<DiscountSnapshot>,
}

impl SubscriptionStatusView {
    fn from_subscription(subscription: Subscription, now: &Timestamp) -> Self {
        let discount = subscription
            .discount
            .filter(|discount| !discount.is_expired_at(now));
        let has_provider_subscription = subscription.provider_subscription_id.is_some();

        Self {
            subscription_id: subscription.id,
            plan: subscription.plan.tier,
            monthly_token_limit: subscription.plan.monthly_token_limit,
            daily_message_limit: subscription.plan.daily_message_limit,
            price_cents: subscription.plan.price_cents,
            currency: subscription.plan.currency,
            status: subscription.status,
            current_period_end: subscription.current_period_end,
            cancel_at_period_end: subscription.cancel_at_period_end,
            has_provider_subscription,
            discount,
        }
    }
}

/// Handler for reading a user's subscription status.
pub struct GetSubscriptionStatusHandler {
    reader: Arc<dyn SubscriptionReader>,
}

impl GetSubscriptionStatusHandler {
    pub fn new(reader: Arc<dyn SubscriptionReader>) -> Self {
        Self { reader }
    }

    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the user has no subscription
    pub async fn handle(
        &self,
        query: GetSubscriptionStatusQuery,
    ) -> Result<SubscriptionStatusView, DomainError> {
        let subscription = self
            .reader
            .get_by_user_id(&query.user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::SubscriptionNotFound,
                    format!("No subscription for user {}", query.user_id),
                )
            })?;

        Ok(SubscriptionStatusView::from_subscription(subscription, &Timestamp::now()))
    }
}
