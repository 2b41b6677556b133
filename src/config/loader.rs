//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides from the process environment.
pub fn apply_env(config: &mut ProxyConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply environment overrides using `lookup` to read variables.
///
/// - `PORT` replaces the port of `listener.bind_address`
/// - `UPSTREAM_URL` replaces `upstream.url`
/// - `GCE_METADATA_HOST` replaces the host of `credentials.metadata_url`
pub fn apply_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PORT") {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port.trim());
    }

    if let Some(upstream) = var("UPSTREAM_URL") {
        config.upstream.url = upstream;
    }

    if let Some(metadata_host) = var("GCE_METADATA_HOST") {
        match Url::parse(&config.credentials.metadata_url) {
            Ok(current) => {
                let mut rebuilt = format!("{}://{}{}", current.scheme(), metadata_host, current.path());
                if let Some(query) = current.query() {
                    rebuilt.push('?');
                    rebuilt.push_str(query);
                }
                config.credentials.metadata_url = rebuilt;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring GCE_METADATA_HOST: metadata_url is not a URL");
            }
        }
    }
}
