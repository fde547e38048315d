//! Subscription reader port (read side).
//!
//! Used by request-serving collaborators that only display subscription
//! state. Reads go straight to the pool, outside any delivery transaction.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, UserId};

#[async_trait]
pub trait SubscriptionReader: Send + Sync {
    /// Returns `None` if the user has no subscription.
    async fn get_by_user_id(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError>;
}
