//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps and the error vocabulary used by the billing
//! domain and its ports.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::{PlanId, SubscriptionId, UserId};
pub use timestamp::Timestamp;
