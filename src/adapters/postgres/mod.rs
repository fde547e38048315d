//! PostgreSQL adapters - Database implementations for the billing ports.
//!
//! - `PostgresBillingUnitOfWork` - One transaction per webhook delivery
//! - `PgBillingTransaction` - Subscription and plan repositories on that transaction
//! - `PostgresSubscriptionReader` - Pool-backed read side

mod billing_store;
mod rows;
mod subscription_reader;

pub use billing_store::{PgBillingTransaction, PostgresBillingUnitOfWork};
pub use subscription_reader::PostgresSubscriptionReader;
