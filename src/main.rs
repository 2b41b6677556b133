//! Identity-token injecting reverse proxy
//!
//! Accepts plain HTTP, forwards every request to one upstream, and attaches
//! a freshly minted OIDC identity token on the way out.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────▶ net::listener ──▶ http::server ──▶ proxy::Forwarder
//!                                                     │
//!                                                     ▼
//!                                            routing::RequestRewriter
//!                                                     │
//!                                                     ▼
//!                                       transport::AuthenticatingTransport
//!                                         (auth::TokenProvider, access log)
//!                                                     │
//!                                                     ▼
//!                                           transport::HttpTransport ──▶ Upstream
//!     Client Response
//!     ◀────── http::response::relay ◀─────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use idtoken_proxy::config::ObservabilityConfig;
use idtoken_proxy::lifecycle::{build_forwarder, resolve_config, Overrides, StartupError};
use idtoken_proxy::observability::{logging, metrics};
use idtoken_proxy::{net, HttpServer, ProxyConfig, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "idtoken-proxy", version, about = "Reverse proxy that attaches identity tokens")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream base URL, overrides config and UPSTREAM_URL
    #[arg(short, long)]
    upstream: Option<String>,

    /// Listen address, overrides config and PORT
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let overrides = Overrides {
        upstream: cli.upstream,
        bind_address: cli.bind,
    };

    let config = match resolve_config(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "idtoken-proxy starting");

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        credentials = ?config.credentials.source,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Metrics(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let forwarder = build_forwarder(&config)?;
    let listener = net::bind(&config.listener).await?;

    let shutdown = Shutdown::on_signal();

    HttpServer::new(forwarder)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
