//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign/propagate request ID)
//!     → handlers.rs (registration + diagnostics)   or
//!       forward.rs (select worker, relay request)
//!     → response.rs (map failures to status codes)
//!     → Send to client
//! ```

pub mod client;
pub mod forward;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, BalancerServer};
