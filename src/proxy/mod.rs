//! Forwarding engine subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request + client address (from the HTTP front end)
//!     → routing::RequestRewriter (outbound request)
//!     → transport::Transport (authenticated send)
//!     → http::response::relay (status, headers, streamed body)
//!     → Client
//!
//! On failure:
//!     ForwardError → gateway-class status, nothing streamed yet
//! ```
//!
//! # Design Decisions
//! - Failures are contained to one request; the engine holds no mutable state
//! - Client disconnect drops the handler future, which aborts the upstream call

pub mod forwarder;

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;

use crate::routing::RewriteError;
use crate::transport::TransportError;

pub use forwarder::Forwarder;

/// Errors the engine turns into gateway responses.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rewrite(_) => StatusCode::BAD_GATEWAY,
            Self::Transport(TransportError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::Transport(TransportError::Credential(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response<Body> {
        let status = self.status();
        let message = match &self {
            Self::Rewrite(_) => "Invalid upstream request",
            Self::Transport(TransportError::Timeout(_)) => "Upstream timed out",
            Self::Transport(TransportError::Credential(_)) => "Upstream credentials unavailable",
            Self::Transport(_) => "Upstream request failed",
        };
        (status, message).into_response()
    }
}
