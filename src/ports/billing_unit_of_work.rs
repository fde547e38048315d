//! Unit of work port for billing writes.
//!
//! Each webhook delivery runs in exactly one transaction: the dispatcher
//! begins it, hands the handler a [`BillingStore`] view of it, then commits
//! on success or rolls back on any error.

use async_trait::async_trait;

use super::BillingStore;
use crate::domain::foundation::DomainError;

/// An open transaction over the billing tables.
#[async_trait]
pub trait BillingTransaction: BillingStore {
    /// Repository view of this transaction.
    fn as_store(&mut self) -> &mut dyn BillingStore;

    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Factory for billing transactions.
#[async_trait]
pub trait BillingUnitOfWork: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn BillingTransaction>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_of_work_is_object_safe() {
        fn _accepts_dyn(_uow: &dyn BillingUnitOfWork) {}
        fn _accepts_tx(_tx: Box<dyn BillingTransaction>) {}
    }
}
