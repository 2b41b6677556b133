//! Upstream transport subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request (already rewritten)
//!     → authenticating.rs (audience → token → Authorization, timing, access log)
//!     → http.rs (hyper-util client: pooled connections, TLS, streaming bodies)
//!     → Upstream
//! ```
//!
//! # Design Decisions
//! - One `Transport` trait; decorators hold an inner transport and implement it too
//! - Transports never retry; a failed send is returned to the caller as-is
//! - Response bodies are streamed, never buffered

pub mod authenticating;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use thiserror::Error;

use crate::auth::CredentialError;

pub use authenticating::{AuthenticatingTransport, CredentialPolicy};
pub use http::HttpTransport;

/// Why a send produced no response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection to the upstream could not be established.
    #[error("upstream unreachable: {0}")]
    Connect(String),

    /// No response headers within the upstream timeout.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// Any other failure while sending or receiving headers.
    #[error("upstream request failed: {0}")]
    Request(String),

    /// Strict mode only: no token, so the request was not sent.
    #[error("no identity token: {0}")]
    Credential(#[from] CredentialError),
}

impl TransportError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect",
            Self::Timeout(_) => "timeout",
            Self::Request(_) => "request",
            Self::Credential(_) => "credential",
        }
    }
}

/// Send an HTTP request and return the response head with a streaming body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError>;
}
