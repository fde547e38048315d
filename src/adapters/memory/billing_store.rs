//! In-Memory Billing Store
//!
//! Implements the billing unit of work, repositories and reader in memory.
//! A transaction works on a private copy of the tables; commit writes back
//! the subscriptions it changed, rollback discards them. Commit replaces
//! whole rows without locking them first, so two transactions touching the
//! same subscription concurrently keep only the last write. Meant for tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::billing::{Plan, PlanTier, Subscription};
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, UserId};
use crate::ports::{
    BillingStore, BillingTransaction, BillingUnitOfWork, PlanRepository, SubscriptionReader,
    SubscriptionRepository,
};

#[derive(Debug, Clone, Default)]
struct BillingTables {
    plans: Vec<Plan>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
}

/// Shared in-memory billing tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBillingStore {
    tables: Arc<RwLock<BillingTables>>,
    committed_writes: Arc<AtomicUsize>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with a plan catalog.
    pub fn with_catalog(plans: Vec<Plan>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(BillingTables {
                plans,
                subscriptions: HashMap::new(),
            })),
            ..Self::default()
        }
    }

    pub async fn add_subscription(&self, subscription: Subscription) {
        self.tables
            .write()
            .await
            .subscriptions
            .insert(subscription.id, subscription);
    }

    pub async fn subscription(&self, id: &SubscriptionId) -> Option<Subscription> {
        self.tables.read().await.subscriptions.get(id).cloned()
    }

    pub async fn subscription_count(&self) -> usize {
        self.tables.read().await.subscriptions.len()
    }

    /// Number of repository writes made durable by commits so far.
    pub fn committed_writes(&self) -> usize {
        self.committed_writes.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollback_count(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BillingUnitOfWork for InMemoryBillingStore {
    async fn begin(&self) -> Result<Box<dyn BillingTransaction>, DomainError> {
        let working = self.tables.read().await.clone();
        Ok(Box::new(InMemoryBillingTransaction {
            working,
            dirty: HashSet::new(),
            writes: 0,
            store: self.clone(),
        }))
    }
}

#[async_trait]
impl SubscriptionReader for InMemoryBillingStore {
    async fn get_by_user_id(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .values()
            .find(|s| &s.user_id == user_id)
            .cloned())
    }
}

/// A private working copy of the tables.
pub struct InMemoryBillingTransaction {
    working: BillingTables,
    dirty: HashSet<SubscriptionId>,
    writes: usize,
    store: InMemoryBillingStore,
}

#[async_trait]
impl SubscriptionRepository for InMemoryBillingTransaction {
    async fn find_by_provider_customer_id(
        &mut self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .working
            .subscriptions
            .values()
            .filter(|s| s.provider_customer_id.as_deref() == Some(customer_id))
            .min_by_key(|s| s.created_at)
            .cloned())
    }

    async fn find_by_user_id(&mut self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .working
            .subscriptions
            .values()
            .find(|s| &s.user_id == user_id)
            .cloned())
    }

    async fn insert(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        if self
            .working
            .subscriptions
            .values()
            .any(|s| s.user_id == subscription.user_id)
        {
            return Err(DomainError::new(
                ErrorCode::SubscriptionExists,
                "User already has a subscription",
            ));
        }
        self.working
            .subscriptions
            .insert(subscription.id, subscription.clone());
        self.dirty.insert(subscription.id);
        self.writes += 1;
        Ok(())
    }

    async fn update(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        match self.working.subscriptions.get_mut(&subscription.id) {
            Some(existing) => {
                *existing = subscription.clone();
                self.dirty.insert(subscription.id);
                self.writes += 1;
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription {} not found", subscription.id),
            )),
        }
    }
}

#[async_trait]
impl PlanRepository for InMemoryBillingTransaction {
    async fn find_by_tier(&mut self, tier: PlanTier) -> Result<Option<Plan>, DomainError> {
        Ok(self.working.plans.iter().find(|p| p.tier == tier).cloned())
    }

    async fn find_by_provider_price_id(&mut self, price_id: &str) -> Result<Option<Plan>, DomainError> {
        Ok(self
            .working
            .plans
            .iter()
            .find(|p| p.provider_price_id.as_deref() == Some(price_id))
            .cloned())
    }
}

#[async_trait]
impl BillingTransaction for InMemoryBillingTransaction {
    fn as_store(&mut self) -> &mut dyn BillingStore {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self {
            mut working,
            dirty,
            writes,
            store,
        } = *self;

        let mut tables = store.tables.write().await;
        for id in dirty {
            if let Some(subscription) = working.subscriptions.remove(&id) {
                tables.subscriptions.insert(id, subscription);
            }
        }
        store.committed_writes.fetch_add(writes, Ordering::SeqCst);
        store.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.store.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
