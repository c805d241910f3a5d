//! Resilience helpers.
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every call to a worker has a deadline
//!   (applied at the call site with `tokio::time::timeout`)
//! - Polling a starting worker backs off exponentially with jitter

pub mod backoff;

pub use backoff::{calculate_backoff, Backoff};
