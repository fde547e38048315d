//! ProvisionSubscriptionHandler - Creates the free subscription for a new user.
//!
//! Called by the registration flow. Every user owns exactly one
//! subscription, starting on the free plan.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::{PlanTier, Subscription};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, UserId};
use crate::ports::{BillingStore, BillingUnitOfWork};

#[derive(Debug, Clone)]
pub struct ProvisionSubscriptionCommand {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct ProvisionSubscriptionResult {
    pub subscription: Subscription,
}

/// Handler for provisioning a user's free subscription.
pub struct ProvisionSubscriptionHandler {
    unit_of_work: Arc<dyn BillingUnitOfWork>,
}

impl ProvisionSubscriptionHandler {
    pub fn new(unit_of_work: Arc<dyn BillingUnitOfWork>) -> Self {
        Self { unit_of_work }
    }

    /// # Errors
    ///
    /// - `SubscriptionExists` if the user already has a subscription
    /// - `PlanNotFound` if the catalog has no free plan
    /// - `DatabaseError` on persistence failure
    pub async fn handle(
        &self,
        cmd: ProvisionSubscriptionCommand,
    ) -> Result<ProvisionSubscriptionResult, DomainError> {
        let mut tx = self.unit_of_work.begin().await?;
        let result = provision(tx.as_store(), cmd.user_id).await;

        match result {
            Ok(subscription) => {
                tx.commit().await?;
                info!(
                    user_id = %subscription.user_id,
                    subscription_id = %subscription.id,
                    "Free subscription provisioned"
                );
                Ok(ProvisionSubscriptionResult { subscription })
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

async fn provision(store: &mut dyn BillingStore, user_id: UserId) -> Result<Subscription, DomainError> {
    if store.find_by_user_id(&user_id).await?.is_some() {
        return Err(DomainError::new(
            ErrorCode::SubscriptionExists,
            format!("User {} already has a subscription", user_id),
        ));
    }

    let free_plan = store.find_by_tier(PlanTier::Free).await?.ok_or_else(|| {
        DomainError::new(ErrorCode::PlanNotFound, "Plan FREE not found in catalog")
    })?;

    let subscription = Subscription::create_free(SubscriptionId::new(), user_id, free_plan);
    store.insert(&subscription).await?;
    Ok(subscription)
}
