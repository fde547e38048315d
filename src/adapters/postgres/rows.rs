//! Row types and column mapping shared by the billing adapters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::billing::{
    DiscountKind, DiscountSnapshot, InvoiceAmount, Plan, PlanTier, Subscription,
    SubscriptionStatus,
};
use crate::domain::foundation::{DomainError, ErrorCode, PlanId, SubscriptionId, Timestamp, UserId};

/// Subscription columns joined with their plan, aliased `plan_*`.
macro_rules! subscription_select {
    () => {
        r#"
        SELECT s.id, s.user_id, s.provider_customer_id, s.provider_subscription_id,
               s.status, s.cancel_at_period_end, s.current_period_end,
               s.discount_coupon_id, s.discount_kind, s.discount_value, s.discount_ends_at,
               s.last_invoice_amount_cents, s.last_invoice_currency,
               s.created_at, s.updated_at,
               p.id AS plan_id, p.tier AS plan_tier,
               p.monthly_token_limit AS plan_monthly_token_limit,
               p.daily_message_limit AS plan_daily_message_limit,
               p.price_cents AS plan_price_cents, p.currency AS plan_currency,
               p.provider_price_id AS plan_provider_price_id,
               p.created_at AS plan_created_at, p.updated_at AS plan_updated_at
        FROM subscriptions s
        JOIN plans p ON p.id = s.plan_id
        "#
    };
}

pub(super) use subscription_select;

pub(super) const PLAN_COLUMNS: &str = r#"
    SELECT id, tier, monthly_token_limit, daily_message_limit, price_cents, currency,
           provider_price_id, created_at, updated_at
    FROM plans
"#;

#[derive(Debug, sqlx::FromRow)]
pub(super) struct PlanRow {
    id: Uuid,
    tier: String,
    monthly_token_limit: i32,
    daily_message_limit: i32,
    price_cents: i64,
    currency: String,
    provider_price_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for Plan {
    type Error = DomainError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        Ok(Plan {
            id: PlanId::from_uuid(row.id),
            tier: parse_tier(&row.tier)?,
            monthly_token_limit: row.monthly_token_limit,
            daily_message_limit: row.daily_message_limit,
            price_cents: row.price_cents,
            currency: row.currency.trim_end().to_string(),
            provider_price_id: row.provider_price_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    provider_customer_id: Option<String>,
    provider_subscription_id: Option<String>,
    status: String,
    cancel_at_period_end: bool,
    current_period_end: Option<DateTime<Utc>>,
    discount_coupon_id: Option<String>,
    discount_kind: Option<String>,
    discount_value: Option<f64>,
    discount_ends_at: Option<DateTime<Utc>>,
    last_invoice_amount_cents: Option<i64>,
    last_invoice_currency: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    plan_id: Uuid,
    plan_tier: String,
    plan_monthly_token_limit: i32,
    plan_daily_message_limit: i32,
    plan_price_cents: i64,
    plan_currency: String,
    plan_provider_price_id: Option<String>,
    plan_created_at: DateTime<Utc>,
    plan_updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let plan = Plan::try_from(PlanRow {
            id: row.plan_id,
            tier: row.plan_tier,
            monthly_token_limit: row.plan_monthly_token_limit,
            daily_message_limit: row.plan_daily_message_limit,
            price_cents: row.plan_price_cents,
            currency: row.plan_currency,
            provider_price_id: row.plan_provider_price_id,
            created_at: row.plan_created_at,
            updated_at: row.plan_updated_at,
        })?;

        let discount = discount_from_columns(
            row.discount_coupon_id,
            row.discount_kind.as_deref(),
            row.discount_value,
            row.discount_ends_at,
        )?;

        let last_invoice = match (row.last_invoice_amount_cents, row.last_invoice_currency) {
            (Some(amount_cents), Some(currency)) => Some(InvoiceAmount {
                amount_cents,
                currency,
            }),
            _ => None,
        };

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            plan,
            provider_customer_id: row.provider_customer_id,
            provider_subscription_id: row.provider_subscription_id,
            status: parse_status(&row.status)?,
            cancel_at_period_end: row.cancel_at_period_end,
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            discount,
            last_invoice,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Flattened discount columns for binding.
pub(super) struct DiscountColumns<'a> {
    pub coupon_id: Option<&'a str>,
    pub kind: Option<&'static str>,
    pub value: Option<f64>,
    pub ends_at: Option<DateTime<Utc>>,
}

pub(super) fn discount_columns(discount: Option<&DiscountSnapshot>) -> DiscountColumns<'_> {
    DiscountColumns {
        coupon_id: discount.map(|d| d.coupon_id.as_str()),
        kind: discount.map(|d| d.kind.as_str()),
        value: discount.map(|d| d.value),
        ends_at: discount.and_then(|d| d.ends_at).map(|t| *t.as_datetime()),
    }
}

fn discount_from_columns(
    coupon_id: Option<String>,
    kind: Option<&str>,
    value: Option<f64>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<Option<DiscountSnapshot>, DomainError> {
    match (coupon_id, kind, value) {
        (Some(coupon_id), Some(kind), Some(value)) => Ok(Some(DiscountSnapshot {
            coupon_id,
            kind: parse_discount_kind(kind)?,
            value,
            ends_at: ends_at.map(Timestamp::from_datetime),
        })),
        (None, None, None) => Ok(None),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            "Partially stored discount",
        )),
    }
}

pub(super) fn parse_tier(s: &str) -> Result<PlanTier, DomainError> {
    PlanTier::parse(s).ok_or_else(|| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid plan tier value: {}", s))
    })
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    SubscriptionStatus::parse(s).ok_or_else(|| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid status value: {}", s))
    })
}

fn parse_discount_kind(s: &str) -> Result<DiscountKind, DomainError> {
    DiscountKind::parse(s).ok_or_else(|| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid discount kind value: {}", s))
    })
}
