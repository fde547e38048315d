//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Write Side
//!
//! - `SubscriptionRepository` / `PlanRepository` - Persistence inside a transaction
//! - `BillingStore` - Both repositories as a single handler-facing object
//! - `BillingUnitOfWork` / `BillingTransaction` - One transaction per delivery
//!
//! ## Read Side
//!
//! - `SubscriptionReader` - Lookups for request-serving collaborators

mod billing_unit_of_work;
mod subscription_reader;
mod subscription_repository;

pub use billing_unit_of_work::{BillingTransaction, BillingUnitOfWork};
pub use subscription_reader::SubscriptionReader;
pub use subscription_repository::{BillingStore, PlanRepository, SubscriptionRepository};
