//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with registration, diagnostic and proxy handlers
//! - Wire up middleware (tracing, request ID, timeout)
//! - Own the worker registry and hand it to every subsystem
//! - Spawn the health monitor and autoscaler alongside the listener
//! - Stop everything on the shared shutdown signal

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::autoscale::Autoscaler;
use crate::config::BalancerConfig;
use crate::health::HealthMonitor;
use crate::http::client::{build_client, HttpClient};
use crate::http::forward::proxy_handler;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::wait as wait_for_shutdown;
use crate::lifecycle::{ProcessController, Shutdown, WorkerController};
use crate::load_balancer::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub client: HttpClient,
    pub forward_timeout: Duration,
}

/// HTTP server for the worker balancer.
pub struct BalancerServer {
    config: BalancerConfig,
    registry: Arc<Registry>,
    controller: Arc<dyn WorkerController>,
}

impl BalancerServer {
    /// Create a server that starts workers as local processes.
    pub fn new(config: BalancerConfig) -> Self {
        let controller = Arc::new(ProcessController::new(
            config.lifecycle.clone(),
            config.health_check.path.clone(),
            Duration::from_secs(config.timeouts.shutdown_request_secs),
        ));
        Self::with_controller(config, controller)
    }

    /// Create a server with a custom worker controller.
    pub fn with_controller(config: BalancerConfig, controller: Arc<dyn WorkerController>) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::new()),
            controller,
        }
    }

    /// Shared handle to the worker registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let forward_timeout = Duration::from_secs(self.config.timeouts.forward_secs);
        let state = AppState {
            registry: self.registry.clone(),
            client: build_client(forward_timeout),
            forward_timeout,
        };

        Router::new()
            .route("/register-worker", post(handlers::register_worker))
            .route("/deregister-worker", post(handlers::deregister_worker))
            .route("/report-load", post(handlers::report_load))
            .route("/next", get(handlers::next_server))
            .route("/list-workers", get(handlers::list_workers))
            .route("/load-balancer-health", get(handlers::balancer_health))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        self.config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server and its background loops until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let monitor = HealthMonitor::new(self.registry.clone(), self.config.health_check.clone());
        let monitor_task = tokio::spawn(monitor.run(shutdown.subscribe()));

        let scaler = Autoscaler::new(
            self.registry.clone(),
            self.controller.clone(),
            self.config.autoscale.clone(),
            self.config.lifecycle.base_port,
        );
        let scaler_task = tokio::spawn(scaler.run(shutdown.subscribe()));

        let app = self.router();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown.subscribe()))
            .await;
        if let Err(ref e) = served {
            tracing::error!(error = %e, "HTTP server failed");
            shutdown.trigger();
        }

        // The loops saw the same signal; wait for them to release their clients.
        let _ = tokio::join!(monitor_task, scaler_task);

        tracing::info!("HTTP server stopped");
        served
    }
}
