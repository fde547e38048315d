//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - sqlx-backed unit of work, repositories and reader
//! - `memory` - In-memory equivalents for tests

pub mod memory;
pub mod postgres;

pub use memory::InMemoryBillingStore;
pub use postgres::{PostgresBillingUnitOfWork, PostgresSubscriptionReader};
