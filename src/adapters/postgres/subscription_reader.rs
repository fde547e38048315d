//! PostgreSQL implementation of SubscriptionReader.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{subscription_select, SubscriptionRow};
use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::SubscriptionReader;

pub struct PostgresSubscriptionReader {
    pool: PgPool,
}

impl PostgresSubscriptionReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionReader for PostgresSubscriptionReader {
    async fn get_by_user_id(&self, user_id: &UserId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> =
            sqlx::query_as(concat!(subscription_select!(), "WHERE s.user_id = $1"))
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database("Failed to read subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }
}
