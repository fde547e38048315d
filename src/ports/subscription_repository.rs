//! Billing repository ports (write side).
//!
//! Repositories operate inside a unit of work: every method takes
//! `&mut self` because implementations run their queries on a single open
//! transaction. Obtain one from [`BillingUnitOfWork`](super::BillingUnitOfWork).
//!
//! # Example
//!
//! ```ignore
//! async fn downgrade(store: &mut dyn BillingStore, customer: &str) -> Result<(), DomainError> {
//!     let Some(mut sub) = store.find_by_provider_customer_id(customer).await? else {
//!         return Ok(());
//!     };
//!     let free = store.find_by_tier(PlanTier::Free).await?.ok_or_else(|| {
//!         DomainError::new(ErrorCode::PlanNotFound, "FREE plan missing")
//!     })?;
//!     sub.reset_to_free(free);
//!     store.update(&sub).await
//! }
//! ```

use async_trait::async_trait;

use crate::domain::billing::{Plan, PlanTier, Subscription};
use crate::domain::foundation::{DomainError, UserId};

/// Repository port for the Subscription aggregate.
#[async_trait]
pub trait SubscriptionRepository: Send {
    /// Find the subscription linked to a provider customer.
    ///
    /// Implementations backed by a database lock the returned row until the
    /// surrounding transaction ends, so concurrent deliveries for the same
    /// customer apply one after the other.
    async fn find_by_provider_customer_id(
        &mut self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Find the subscription owned by a user.
    async fn find_by_user_id(&mut self, user_id: &UserId) -> Result<Option<Subscription>, DomainError>;

    /// Insert a new subscription.
    ///
    /// # Errors
    ///
    /// - `SubscriptionExists` if the user already has one
    /// - `DatabaseError` on persistence failure
    async fn insert(&mut self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Persist every field of an existing subscription.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the row doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&mut self, subscription: &Subscription) -> Result<(), DomainError>;
}

/// Read access to the plan catalog.
#[async_trait]
pub trait PlanRepository: Send {
    async fn find_by_tier(&mut self, tier: PlanTier) -> Result<Option<Plan>, DomainError>;

    async fn find_by_provider_price_id(&mut self, price_id: &str) -> Result<Option<Plan>, DomainError>;
}

/// Everything a webhook handler may touch, as one object.
pub trait BillingStore: SubscriptionRepository + PlanRepository {}

impl<T: SubscriptionRepository + PlanRepository + ?Sized> BillingStore for T {}
