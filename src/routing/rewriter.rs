//! Request rewriting onto the fixed upstream.
//!
//! # Responsibilities
//! - Point the request URI at the upstream's scheme and authority
//! - Preserve the inbound path and query byte-for-byte
//! - Strip hop-by-hop headers and the inbound `Host`
//! - Set X-Forwarded-* from the proxy's own view of the connection
//!
//! # Design Decisions
//! - Pure transformation: no I/O, no validation beyond the URI builder
//! - The body is moved, never read, so it is consumed exactly once downstream

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{header, request::Parts, Request, Uri};
use thiserror::Error;

use crate::http::headers;
use crate::routing::Upstream;

/// Value written to `X-Forwarded-Proto`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardedProto {
    /// Fixed per deployment (e.g. `https` behind a TLS-terminating load balancer).
    Fixed(String),
    /// Scheme of the inbound connection. The listener never terminates TLS,
    /// so this is always `http`; the request URI's scheme is client input.
    Inbound,
}

impl ForwardedProto {
    pub fn from_config(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(proto) if !proto.is_empty() => Self::Fixed(proto.to_string()),
            _ => Self::Inbound,
        }
    }

    fn resolve(&self) -> &str {
        match self {
            Self::Fixed(proto) => proto,
            Self::Inbound => "http",
        }
    }
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("could not build upstream URI: {0}")]
    Uri(#[from] axum::http::Error),
}

/// Rewrites inbound requests so they target the upstream.
#[derive(Debug, Clone)]
pub struct RequestRewriter {
    upstream: Upstream,
    forwarded_proto: ForwardedProto,
}

impl RequestRewriter {
    pub fn new(upstream: Upstream, forwarded_proto: ForwardedProto) -> Self {
        Self {
            upstream,
            forwarded_proto,
        }
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Turn an inbound request into the outbound request for the upstream.
    pub fn rewrite(
        &self,
        request: Request<Body>,
        client_addr: SocketAddr,
    ) -> Result<Request<Body>, RewriteError> {
        let (mut parts, body) = request.into_parts();

        let inbound_host = inbound_host(&parts);
        let proto = self.forwarded_proto.resolve().to_string();

        let path = single_joining_slash(self.upstream.base_path(), parts.uri.path());
        let path_and_query = match merge_query(self.upstream.base_query(), parts.uri.query()) {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };

        parts.uri = Uri::builder()
            .scheme(self.upstream.scheme().clone())
            .authority(self.upstream.authority().clone())
            .path_and_query(path_and_query)
            .build()?;

        headers::strip_request_hop_by_hop(&mut parts.headers);
        parts.headers.remove(header::HOST);
        headers::set_forwarded(
            &mut parts.headers,
            client_addr.ip(),
            inbound_host.as_deref(),
            &proto,
        );

        Ok(Request::from_parts(parts, body))
    }
}

/// Host the client addressed: the absolute-form authority, else the `Host` header.
fn inbound_host(parts: &Parts) -> Option<String> {
    parts
        .uri
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            parts
                .headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

fn single_joining_slash(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

fn merge_query(base: Option<&str>, inbound: Option<&str>) -> Option<String> {
    match (base.filter(|q| !q.is_empty()), inbound.filter(|q| !q.is_empty())) {
        (Some(base), Some(inbound)) => Some(format!("{}&{}", base, inbound)),
        (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    }
}
