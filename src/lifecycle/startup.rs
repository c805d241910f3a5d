//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener
//! - Hook OS signals to the shutdown coordinator
//! - Run the server until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::BalancerConfig;
use crate::http::BalancerServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Run a balancer with `config` until SIGINT/SIGTERM.
pub async fn run(config: BalancerConfig) -> Result<(), std::io::Error> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::trigger_on_signal(shutdown.clone());

    BalancerServer::new(config).run(listener, shutdown).await
}
