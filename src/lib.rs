//! HTTP load balancer for a self-registering worker pool.
//!
//! Workers register themselves, are probed periodically, receive traffic in
//! round-robin order while healthy, and are started or retired by an
//! autoscaler as aggregate load changes.

pub mod autoscale;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod resilience;

pub use config::BalancerConfig;
pub use error::{BalancerError, ForwardError};
pub use http::BalancerServer;
pub use lifecycle::{Shutdown, WorkerController};
pub use load_balancer::Registry;
