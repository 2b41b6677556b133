//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all route)
//!     → request.rs (request ID)
//!     → [proxy::Forwarder rewrites and sends]
//!     → headers.rs (hop-by-hop, X-Forwarded-*)
//!     → response.rs (relay status, headers, streamed body)
//!     → Send to client
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
