//! Audience, token and credential error types.

use std::fmt;
use std::time::Duration;

use axum::http::{HeaderValue, Uri};
use thiserror::Error;

/// Why a token could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The identity backend could not be reached.
    #[error("token source unavailable: {0}")]
    Unavailable(String),

    /// The identity backend answered with a non-success status.
    #[error("token request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The backend answered but the token is unusable.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The fetch did not complete within the configured timeout.
    #[error("token fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The provider or the request is misconfigured.
    #[error("credential provider misconfigured: {0}")]
    Misconfigured(String),
}

/// Scope a token is minted for: `https://` + target host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Audience(String);

impl Audience {
    pub fn for_host(host: &str) -> Self {
        Self(format!("https://{}", host))
    }

    /// Audience for a request URI. Neither the port nor IPv6 brackets are
    /// part of the audience.
    pub fn from_uri(uri: &Uri) -> Option<Self> {
        uri.host()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .filter(|h| !h.is_empty())
            .map(Self::for_host)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bearer credential. Never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CredentialError::InvalidToken("empty token".to_string()));
        }
        Ok(Self(value))
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value, marked sensitive.
    pub fn bearer_header(&self) -> Result<HeaderValue, CredentialError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0)).map_err(|_| {
            CredentialError::InvalidToken("token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}
