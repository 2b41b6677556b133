//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Report bind failures as a distinct, fatal error

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured address is not a socket address.
    #[error("Invalid bind address `{0}`")]
    Address(String),
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the listener described by `config`.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|_| ListenerError::Address(config.bind_address.clone()))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ListenerError::Bind { addr, source })?;

    let local_addr = listener
        .local_addr()
        .map_err(|source| ListenerError::Bind { addr, source })?;

    tracing::info!(address = %local_addr, "Listener bound");
    Ok(listener)
}
