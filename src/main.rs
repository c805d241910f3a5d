//! Worker balancer
//!
//! Routes HTTP traffic across a pool of self-registering workers.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌───────────────────────────────────────────────────┐
//!                              │                  WORKER BALANCER                   │
//!                              │                                                    │
//!     Client Request           │  ┌─────────┐    ┌──────────┐    ┌──────────────┐  │
//!     ─────────────────────────┼─▶│  http   │───▶│ forward  │───▶│   registry   │  │
//!                              │  │ server  │    │          │    │ + round robin│  │
//!                              │  └─────────┘    └────┬─────┘    └──────▲───────┘  │
//!                              │                      │                 │          │
//!     Client Response          │                      ▼                 │          │
//!     ◀────────────────────────┼──────────────── worker call ◀──────────┼──────────┼──── Worker
//!                              │                                        │          │
//!     Worker registration      │  ┌──────────────┐   ┌──────────────┐   │          │
//!     ─────────────────────────┼─▶│   handlers   │──▶│ health       │───┤          │
//!                              │  └──────────────┘   │ monitor      │   │          │
//!                              │                     └──────────────┘   │          │
//!                              │                     ┌──────────────┐   │          │
//!                              │                     │ autoscaler   │───┘          │
//!                              │                     │ + lifecycle  │              │
//!                              │                     └──────────────┘              │
//!                              └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use worker_balancer::config::{load_config, BalancerConfig};
use worker_balancer::lifecycle::startup;
use worker_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "worker-balancer")]
#[command(about = "HTTP load balancer with health checks and autoscaling", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);

    tracing::info!("worker-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        health_interval_secs = config.health_check.interval_secs,
        autoscale = config.autoscale.enabled,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
