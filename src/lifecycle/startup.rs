//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration from file, environment and command line
//! - Build the credential provider, transports and forwarder in dependency order
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Later sources win: file < environment < command line

use std::path::Path;

use thiserror::Error;

use crate::auth::{provider_from_config, CredentialError};
use crate::config::loader::{apply_env, read_config};
use crate::config::validation::validate_config;
use crate::config::{ConfigError, ProxyConfig};
use crate::net::ListenerError;
use crate::proxy::Forwarder;
use crate::routing::{ForwardedProto, RequestRewriter, Upstream, UpstreamError};
use crate::transport::{AuthenticatingTransport, CredentialPolicy, HttpTransport};

/// The forwarder the binary runs: real HTTP underneath identity tokens.
pub type AuthenticatedForwarder = Forwarder<AuthenticatingTransport<HttpTransport>>;

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub upstream: Option<String>,
    pub bind_address: Option<String>,
}

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid upstream: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Credential provider error: {0}")]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Bind(#[from] ListenerError),

    #[error("Failed to start metrics exporter: {0}")]
    Metrics(String),

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Produce the effective configuration.
///
/// Without a path the built-in defaults are the base layer.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    apply_env(&mut config);
    apply_cli(&mut config, overrides);

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_cli(config: &mut ProxyConfig, overrides: &Overrides) {
    if let Some(upstream) = &overrides.upstream {
        config.upstream.url = upstream.clone();
    }
    if let Some(bind) = &overrides.bind_address {
        config.listener.bind_address = bind.clone();
    }
}

/// Assemble the forwarding engine described by a validated config.
pub fn build_forwarder(config: &ProxyConfig) -> Result<AuthenticatedForwarder, StartupError> {
    let upstream = Upstream::parse(&config.upstream.url)?;
    let proto = ForwardedProto::from_config(config.upstream.forwarded_proto.as_deref());
    let rewriter = RequestRewriter::new(upstream, proto);

    let tokens = provider_from_config(&config.credentials)?;
    let policy = CredentialPolicy::from_config(config);
    let transport = AuthenticatingTransport::new(HttpTransport::new(&config.timeouts), tokens, policy);

    tracing::info!(
        upstream = %rewriter.upstream(),
        strict = policy.strict,
        "Forwarder ready"
    );
    Ok(Forwarder::new(rewriter, transport))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;

    #[test]
    fn cli_beats_defaults() {
        let overrides = Overrides {
            upstream: Some("https://backend.example".to_string()),
            bind_address: Some("127.0.0.1:0".to_string()),
        };
        let config = resolve_config(None, &overrides).unwrap();
        assert_eq!(config.upstream.url, "https://backend.example");
        assert_eq!(config.listener.bind_address, "127.0.0.1:0");
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("missing-{}.toml", uuid::Uuid::new_v4()));
        let result = resolve_config(Some(&path), &Overrides::default());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn unparseable_upstream_fails_validation() {
        let overrides = Overrides {
            upstream: Some("not a url".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve_config(None, &overrides),
            Err(ConfigError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn builds_forwarder_with_static_token() {
        let mut config = ProxyConfig::default();
        config.upstream.url = "http://127.0.0.1:9000/base".to_string();
        config.credentials.source = CredentialSource::Static;
        config.credentials.static_token = Some("dev".to_string());

        let forwarder = build_forwarder(&config).unwrap();
        assert_eq!(forwarder.rewriter().upstream().base_path(), "/base");
    }
}
