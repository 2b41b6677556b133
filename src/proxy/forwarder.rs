//! The forwarding engine.

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;

use crate::http::response::relay;
use crate::observability::metrics;
use crate::proxy::ForwardError;
use crate::routing::RequestRewriter;
use crate::transport::Transport;

/// Rewrites inbound requests, sends them through the transport, and relays
/// the upstream response.
pub struct Forwarder<T> {
    rewriter: RequestRewriter,
    transport: T,
}

impl<T: Transport> Forwarder<T> {
    pub fn new(rewriter: RequestRewriter, transport: T) -> Self {
        Self {
            rewriter,
            transport,
        }
    }

    pub fn rewriter(&self) -> &RequestRewriter {
        &self.rewriter
    }

    /// Handle one inbound request. Never fails: errors become gateway responses.
    pub async fn handle(&self, request: Request<Body>, client_addr: SocketAddr) -> Response<Body> {
        match self.forward(request, client_addr).await {
            Ok(response) => relay(response),
            Err(error) => error.into_response(),
        }
    }

    async fn forward(
        &self,
        request: Request<Body>,
        client_addr: SocketAddr,
    ) -> Result<Response<Body>, ForwardError> {
        let method = request.method().clone();

        let outbound = self.rewriter.rewrite(request, client_addr).map_err(|error| {
            tracing::error!(method = %method, error = %error, "Failed to rewrite request");
            ForwardError::Rewrite(error)
        })?;
        let url = outbound.uri().to_string();

        self.transport.send(outbound).await.map_err(|error| {
            metrics::record_upstream_error(error.kind());
            tracing::error!(
                method = %method,
                url = %url,
                client = %client_addr,
                error = %error,
                "Upstream request failed"
            );
            ForwardError::Transport(error)
        })
    }
}
