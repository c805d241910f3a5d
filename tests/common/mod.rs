//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use worker_balancer::config::BalancerConfig;
use worker_balancer::http::BalancerServer;
use worker_balancer::lifecycle::{Shutdown, WorkerController};
use worker_balancer::load_balancer::Registry;

/// Programmable stand-in for a worker process.
#[derive(Default)]
pub struct MockWorker {
    pub unhealthy: AtomicBool,
    pub load: AtomicU64,
    pub hits: AtomicU64,
    pub shutdown_requested: AtomicBool,
}

impl MockWorker {
    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    pub fn set_load(&self, load: u64) {
        self.load.store(load, Ordering::SeqCst);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn worker_health(State(worker): State<Arc<MockWorker>>) -> impl IntoResponse {
    if worker.unhealthy.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "ERROR" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "status": "OK",
            "active_requests": worker.load.load(Ordering::SeqCst),
        })),
    )
}

async fn worker_shutdown(State(worker): State<Arc<MockWorker>>) -> StatusCode {
    worker.shutdown_requested.store(true, Ordering::SeqCst);
    StatusCode::OK
}

/// Echo back what the worker received so tests can inspect forwarding.
async fn echo(State(worker): State<Arc<MockWorker>>, req: Request) -> impl IntoResponse {
    worker.hits.fetch_add(1, Ordering::SeqCst);
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let body = json!({
        "method": req.method().as_str(),
        "uri": req.uri().to_string(),
        "x_request_id": header("x-request-id"),
        "x_custom": header("x-custom"),
        "connection": header("connection"),
    });
    (StatusCode::CREATED, [("x-worker", "mock")], Json(body))
}

/// Start a mock worker on an ephemeral port. Returns its `host:port` address.
pub async fn start_mock_worker() -> (String, Arc<MockWorker>) {
    let worker = Arc::new(MockWorker::default());
    let app = Router::new()
        .route("/worker-health", get(worker_health))
        .route("/shutdown", post(worker_shutdown))
        .fallback(echo)
        .with_state(worker.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr.to_string(), worker)
}

/// Start a raw TCP backend that answers every request with `response`
/// verbatim, HTTP or not.
pub async fn start_raw_backend(response: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr.to_string()
}

/// Start a backend that accepts connections and never answers.
pub async fn start_hung_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                while let Ok(n) = socket.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
            });
        }
    });

    addr.to_string()
}

/// Address on which nothing is listening.
pub async fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

/// Config for tests: background loops off, short timeouts.
pub fn test_config() -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.health_check.enabled = false;
    config.health_check.timeout_secs = 1;
    config.autoscale.enabled = false;
    config.timeouts.forward_secs = 2;
    config.timeouts.request_secs = 5;
    config
}

/// A running balancer bound to an ephemeral port.
pub struct TestBalancer {
    pub addr: SocketAddr,
    pub registry: Arc<Registry>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl TestBalancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

pub async fn start_balancer(config: BalancerConfig) -> TestBalancer {
    start_server(BalancerServer::new(config)).await
}

pub async fn start_balancer_with_controller(
    config: BalancerConfig,
    controller: Arc<dyn WorkerController>,
) -> TestBalancer {
    start_server(BalancerServer::with_controller(config, controller)).await
}

async fn start_server(server: BalancerServer) -> TestBalancer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let registry = server.registry();
    let shutdown = Shutdown::new();

    let handle = tokio::spawn(server.run(listener, shutdown.clone()));

    TestBalancer {
        addr,
        registry,
        shutdown,
        handle,
    }
}

/// Client that never reuses connections between requests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
