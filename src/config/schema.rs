//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default metadata server endpoint that issues identity tokens.
pub const DEFAULT_METADATA_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/identity";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream every request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Where identity tokens come from and what happens when they don't.
    pub credentials: CredentialsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream (e.g., "https://backend.example").
    pub url: String,

    /// Fixed `X-Forwarded-Proto` value. When unset the value is derived
    /// from the inbound request.
    pub forwarded_proto: Option<String>,
}

/// Source of identity tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// Instance metadata server (identity endpoint).
    #[default]
    Metadata,
    /// A token fixed in configuration. Intended for local development.
    Static,
}

/// Credential configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Which provider issues tokens.
    pub source: CredentialSource,

    /// Identity endpoint of the metadata server.
    pub metadata_url: String,

    /// Token used when `source = "static"`.
    pub static_token: Option<String>,

    /// Reject requests when no token can be obtained instead of forwarding
    /// them unauthenticated.
    pub strict: bool,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            source: CredentialSource::Metadata,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            static_token: None,
            strict: false,
        }
    }
}

/// Timeout configuration for various operations.
///
/// A value of `0` disables the corresponding timeout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Token fetch timeout in seconds.
    pub token_secs: u64,

    /// Upstream send timeout (until response headers arrive) in seconds.
    pub upstream_secs: u64,
}

impl TimeoutConfig {
    pub fn connect(&self) -> Option<Duration> {
        non_zero_secs(self.connect_secs)
    }

    pub fn token(&self) -> Option<Duration> {
        non_zero_secs(self.token_secs)
    }

    pub fn upstream(&self) -> Option<Duration> {
        non_zero_secs(self.upstream_secs)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            token_secs: 10,
            upstream_secs: 60,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_8080_and_fail_open() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.credentials.source, CredentialSource::Metadata);
        assert!(!config.credentials.strict);
        assert_eq!(config.credentials.metadata_url, DEFAULT_METADATA_URL);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let timeouts = TimeoutConfig {
            connect_secs: 0,
            token_secs: 3,
            upstream_secs: 0,
        };
        assert_eq!(timeouts.connect(), None);
        assert_eq!(timeouts.token(), Some(Duration::from_secs(3)));
        assert_eq!(timeouts.upstream(), None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstream]
            url = "https://backend.example"

            [credentials]
            source = "static"
            static_token = "dev-token"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.url, "https://backend.example");
        assert_eq!(config.credentials.source, CredentialSource::Static);
        assert_eq!(config.credentials.static_token.as_deref(), Some("dev-token"));
        assert_eq!(config.timeouts.token_secs, 10);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }
}
