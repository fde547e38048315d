//! Subscription Sync - billing provider webhook synchronization
//!
//! Keeps each user's local subscription record (plan, status, billing period,
//! provider identifiers, discount) consistent with the payment provider by
//! processing its webhook events.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
