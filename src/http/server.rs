//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Hand every request to the forwarding engine
//! - Drain in-flight requests on shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::{request_id, UuidRequestId};
use crate::proxy::Forwarder;
use crate::transport::Transport;

/// HTTP front end for the proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server that forwards every request through `forwarder`.
    pub fn new<T>(forwarder: Forwarder<T>) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            router: Self::build_router(Arc::new(forwarder)),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<T>(forwarder: Arc<Forwarder<T>>) -> Router
    where
        T: Transport + 'static,
    {
        Router::new()
            .route("/", any(proxy_handler::<T>))
            .route("/{*path}", any(proxy_handler::<T>))
            .with_state(forwarder)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = request_id(request).unwrap_or("-"),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until a shutdown message arrives, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every method and path is forwarded.
async fn proxy_handler<T>(
    State(forwarder): State<Arc<Forwarder<T>>>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response<Body>
where
    T: Transport + 'static,
{
    forwarder.handle(request, client_addr).await
}
