//! Authentication and access logging around any [`Transport`].
//!
//! # Responsibilities
//! - Derive the audience from the outbound (post-rewrite) host
//! - Fetch a fresh token per request and set `Authorization: Bearer <token>`
//! - Time the inner send and emit one access log record per response
//!
//! # Design Decisions
//! - Fail-open by default: a token failure is logged once and the request is
//!   forwarded without touching `Authorization`
//! - Strict mode turns a token failure into `TransportError::Credential`
//! - Inner send failures pass through unchanged and produce no access log line

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};

use crate::auth::{Audience, CredentialError, TokenProvider};
use crate::config::ProxyConfig;
use crate::observability::{metrics, AccessLogRecord, CREDENTIALS_TARGET};
use crate::resilience::{with_timeout, TimedOut};
use crate::transport::{Transport, TransportError};

/// What to do about credentials, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CredentialPolicy {
    /// Refuse to send when no token could be obtained.
    pub strict: bool,
    /// Deadline for one token fetch.
    pub timeout: Option<Duration>,
}

impl CredentialPolicy {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            strict: config.credentials.strict,
            timeout: config.timeouts.token(),
        }
    }
}

/// Decorates an inner transport with identity tokens and access logging.
pub struct AuthenticatingTransport<T> {
    inner: T,
    tokens: Arc<dyn TokenProvider>,
    policy: CredentialPolicy,
}

impl<T: Transport> AuthenticatingTransport<T> {
    pub fn new(inner: T, tokens: Arc<dyn TokenProvider>, policy: CredentialPolicy) -> Self {
        Self {
            inner,
            tokens,
            policy,
        }
    }

    pub fn policy(&self) -> CredentialPolicy {
        self.policy
    }

    async fn authorize(
        &self,
        request: &mut Request<Body>,
        audience: Option<&Audience>,
    ) -> Result<(), CredentialError> {
        let audience = audience.ok_or_else(|| {
            CredentialError::Misconfigured("outbound request has no host".to_string())
        })?;

        let token = with_timeout(self.policy.timeout, self.tokens.token(audience))
            .await
            .map_err(|TimedOut(limit)| CredentialError::Timeout(limit))??;

        request
            .headers_mut()
            .insert(header::AUTHORIZATION, token.bearer_header()?);
        Ok(())
    }
}

#[async_trait]
impl<T: Transport> Transport for AuthenticatingTransport<T> {
    async fn send(&self, mut request: Request<Body>) -> Result<Response<Body>, TransportError> {
        let audience = Audience::from_uri(request.uri());

        if let Err(error) = self.authorize(&mut request, audience.as_ref()).await {
            metrics::record_credential_failure();
            let audience = audience.as_ref().map(Audience::as_str).unwrap_or("");
            if self.policy.strict {
                tracing::error!(
                    target: CREDENTIALS_TARGET,
                    audience,
                    error = %error,
                    "Failed to obtain identity token, rejecting request: {}",
                    error
                );
                return Err(TransportError::Credential(error));
            }
            tracing::error!(
                target: CREDENTIALS_TARGET,
                audience,
                error = %error,
                "Failed to obtain identity token, forwarding unauthenticated: {}",
                error
            );
        }

        let method = request.method().clone();
        let url = request.uri().to_string();

        let start = Instant::now();
        let response = self.inner.send(request).await?;

        let record = AccessLogRecord {
            method,
            url,
            status: response.status(),
            duration: start.elapsed(),
        };
        record.emit();
        metrics::record_request(record.method.as_str(), record.status.as_u16(), record.duration);

        Ok(response)
    }
}
