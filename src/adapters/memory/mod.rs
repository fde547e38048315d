//! In-memory adapters for tests.

mod billing_store;

pub use billing_store::{InMemoryBillingStore, InMemoryBillingTransaction};
