//! PostgreSQL unit of work for webhook deliveries.
//!
//! `PostgresBillingUnitOfWork` opens one `sqlx::Transaction` per delivery.
//! `PgBillingTransaction` runs every repository query on that transaction
//! and locks subscription rows read by customer id until commit.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::rows::{discount_columns, subscription_select, PlanRow, SubscriptionRow, PLAN_COLUMNS};
use crate::domain::billing::{Plan, PlanTier, Subscription};
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{
    BillingStore, BillingTransaction, BillingUnitOfWork, PlanRepository, SubscriptionRepository,
};

/// Begins billing transactions on a connection pool.
#[derive(Debug, Clone)]
pub struct PostgresBillingUnitOfWork {
    pool: PgPool,
}

impl PostgresBillingUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillingUnitOfWork for PostgresBillingUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn BillingTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;
        Ok(Box::new(PgBillingTransaction { tx }))
    }
}

/// Repository access scoped to one open transaction.
pub struct PgBillingTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SubscriptionRepository for PgBillingTransaction {
    async fn find_by_provider_customer_id(
        &mut self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(concat!(
            subscription_select!(),
            "WHERE s.provider_customer_id = $1 ORDER BY s.created_at LIMIT 1 FOR UPDATE OF s"
        ))
        .bind(customer_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database("Failed to find subscription by customer", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_by_user_id(&mut self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(concat!(
            subscription_select!(),
            "WHERE s.user_id = $1 FOR UPDATE OF s"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database("Failed to find subscription by user", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn insert(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        let discount = discount_columns(subscription.discount.as_ref());
        let invoice = subscription.last_invoice.as_ref();

        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_id, provider_customer_id, provider_subscription_id,
                status, cancel_at_period_end, current_period_end,
                discount_coupon_id, discount_kind, discount_value, discount_ends_at,
                last_invoice_amount_cents, last_invoice_currency, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(subscription.plan.id.as_uuid())
        .bind(&subscription.provider_customer_id)
        .bind(&subscription.provider_subscription_id)
        .bind(subscription.status.as_str())
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.current_period_end.map(|t| *t.as_datetime()))
        .bind(discount.coupon_id)
        .bind(discount.kind)
        .bind(discount.value)
        .bind(discount.ends_at)
        .bind(invoice.map(|i| i.amount_cents))
        .bind(invoice.map(|i| i.currency.as_str()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("subscriptions_user_id_key") {
                    return DomainError::new(
                        ErrorCode::SubscriptionExists,
                        "User already has a subscription",
                    );
                }
            }
            DomainError::database("Failed to insert subscription", e)
        })?;

        Ok(())
    }

    async fn update(&mut self, subscription: &Subscription) -> Result<(), DomainError> {
        let discount = discount_columns(subscription.discount.as_ref());
        let invoice = subscription.last_invoice.as_ref();

        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan_id = $2,
                provider_customer_id = $3,
                provider_subscription_id = $4,
                status = $5,
                cancel_at_period_end = $6,
                current_period_end = $7,
                discount_coupon_id = $8,
                discount_kind = $9,
                discount_value = $10,
                discount_ends_at = $11,
                last_invoice_amount_cents = $12,
                last_invoice_currency = $13,
                updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.plan.id.as_uuid())
        .bind(&subscription.provider_customer_id)
        .bind(&subscription.provider_subscription_id)
        .bind(subscription.status.as_str())
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.current_period_end.map(|t| *t.as_datetime()))
        .bind(discount.coupon_id)
        .bind(discount.kind)
        .bind(discount.value)
        .bind(discount.ends_at)
        .bind(invoice.map(|i| i.amount_cents))
        .bind(invoice.map(|i| i.currency.as_str()))
        .bind(subscription.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database("Failed to update subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription {} not found", subscription.id),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl PlanRepository for PgBillingTransaction {
    async fn find_by_tier(&mut self, tier: PlanTier) -> Result<Option<Plan>, DomainError> {
        let sql = format!("{} WHERE tier = $1", PLAN_COLUMNS);
        let row: Option<PlanRow> = sqlx::query_as(&sql)
            .bind(tier.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("Failed to find plan by tier", e))?;

        row.map(Plan::try_from).transpose()
    }

    async fn find_by_provider_price_id(&mut self, price_id: &str) -> Result<Option<Plan>, DomainError> {
        let sql = format!("{} WHERE provider_price_id = $1", PLAN_COLUMNS);
        let row: Option<PlanRow> = sqlx::query_as(&sql)
            .bind(price_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::database("Failed to find plan by price id", e))?;

        row.map(Plan::try_from).transpose()
    }
}

#[async_trait]
impl BillingTransaction for PgBillingTransaction {
    fn as_store(&mut self) -> &mut dyn BillingStore {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self { tx } = *self;
        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        let Self { tx } = *self;
        tx.rollback()
            .await
            .map_err(|e| DomainError::database("Failed to roll back transaction", e))
    }
}
