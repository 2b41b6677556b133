//! The fixed upstream target.

use std::fmt;
use std::str::FromStr;

use axum::http::uri::{Authority, Scheme};
use thiserror::Error;
use url::Url;

/// Why an upstream URL was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("URL must not carry a fragment")]
    Fragment,

    #[error("invalid authority `{0}`")]
    InvalidAuthority(String),
}

/// A validated upstream base URL.
///
/// Parsed once at startup; the per-request rewrite only copies its parts.
#[derive(Debug, Clone)]
pub struct Upstream {
    url: Url,
    scheme: Scheme,
    authority: Authority,
}

impl Upstream {
    /// Parse and validate an upstream base URL.
    pub fn parse(input: &str) -> Result<Self, UpstreamError> {
        let url = Url::parse(input.trim())?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(UpstreamError::UnsupportedScheme(other.to_string())),
        };

        let host = url.host_str().ok_or(UpstreamError::MissingHost)?;
        if url.fragment().is_some() {
            return Err(UpstreamError::Fragment);
        }

        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let authority = Authority::from_str(&authority)
            .map_err(|_| UpstreamError::InvalidAuthority(authority.clone()))?;

        Ok(Self {
            url,
            scheme,
            authority,
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Path prefix every forwarded path is joined onto. At least `/`.
    pub fn base_path(&self) -> &str {
        self.url.path()
    }

    /// Query carried by the upstream URL itself, if any.
    pub fn base_query(&self) -> Option<&str> {
        self.url.query().filter(|q| !q.is_empty())
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
