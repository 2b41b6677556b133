//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream URL is well-formed
//! - Check the credential source has what it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{CredentialSource, ProxyConfig};
use crate::routing::Upstream;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("upstream.url is required")]
    MissingUpstream,

    #[error("upstream.url: {0}")]
    Upstream(String),

    #[error("upstream.forwarded_proto must not be empty")]
    EmptyForwardedProto,

    #[error("credentials.static_token is required when source is \"static\"")]
    MissingStaticToken,

    #[error("credentials.metadata_url `{0}` is not an absolute http(s) URL")]
    MetadataUrl(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.url.trim().is_empty() {
        errors.push(ValidationError::MissingUpstream);
    } else if let Err(e) = Upstream::parse(&config.upstream.url) {
        errors.push(ValidationError::Upstream(e.to_string()));
    }

    if let Some(proto) = &config.upstream.forwarded_proto {
        if proto.trim().is_empty() {
            errors.push(ValidationError::EmptyForwardedProto);
        }
    }

    match config.credentials.source {
        CredentialSource::Static => {
            let missing = config
                .credentials
                .static_token
                .as_deref()
                .map_or(true, |t| t.trim().is_empty());
            if missing {
                errors.push(ValidationError::MissingStaticToken);
            }
        }
        CredentialSource::Metadata => {
            let valid = Url::parse(&config.credentials.metadata_url)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
                .unwrap_or(false);
            if !valid {
                errors.push(ValidationError::MetadataUrl(
                    config.credentials.metadata_url.clone(),
                ));
            }
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
