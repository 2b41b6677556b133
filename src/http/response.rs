//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the client
//! - Strip hop-by-hop headers
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Header order and duplicate headers are preserved
//! - Status line is copied as-is, including non-standard codes

use axum::body::Body;
use axum::http::Response;

use crate::http::headers::strip_hop_by_hop;

/// Prepare an upstream response for the client connection.
pub fn relay(response: Response<Body>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};

    #[tokio::test]
    async fn keeps_status_headers_and_body() {
        let upstream = Response::builder()
            .status(StatusCode::IM_A_TEAPOT)
            .header("set-cookie", "a=1")
            .header("set-cookie", "b=2")
            .header(header::CONNECTION, "close")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("short and stout"))
            .unwrap();

        let relayed = relay(upstream);

        assert_eq!(relayed.status(), StatusCode::IM_A_TEAPOT);
        assert!(relayed.headers().get(header::CONNECTION).is_none());
        let cookies: Vec<_> = relayed.headers().get_all("set-cookie").iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"]);

        let body = axum::body::to_bytes(relayed.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"short and stout");
    }
}
