//! Structured logging.
//!
//! Uses `tracing` for structured events. `RUST_LOG` takes precedence over the
//! configured level so a single run can be made more verbose without editing
//! the config file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter used when `RUST_LOG` is not set.
pub fn default_filter(log_level: &str) -> String {
    format!("worker_balancer={level},balancer_cli={level},tower_http={level}", level = log_level)
}

/// Install the global subscriber. Calling this twice is harmless; the second
/// attempt is ignored.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
