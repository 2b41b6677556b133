//! The underlying send, backed by the `hyper-util` pooled client.
//!
//! The outbound `Uri` is written to the wire as built by the rewriter: no
//! dot-segment removal, no re-encoding.

use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;
use crate::resilience::{with_timeout, TimedOut};
use crate::transport::{Transport, TransportError};

type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Plain HTTP(S) transport.
///
/// Redirects are not followed: the upstream's 3xx responses are relayed to
/// the client untouched.
#[derive(Clone)]
pub struct HttpTransport {
    client: UpstreamClient,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(timeouts.connect());

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        Self {
            client: Client::builder(TokioExecutor::new()).build(https),
            timeout: timeouts.upstream(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        let response: Response<Incoming> = with_timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|TimedOut(limit)| TransportError::Timeout(limit))?
            .map_err(classify)?;

        Ok(response.map(Body::new))
    }
}

fn classify(error: hyper_util::client::legacy::Error) -> TransportError {
    let message = error_chain(&error);
    if error.is_connect() {
        TransportError::Connect(message)
    } else {
        TransportError::Request(message)
    }
}

/// `error: cause: cause` so the root cause (e.g. connection refused) is visible.
fn error_chain(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method, StatusCode};
    use wiremock::matchers::{body_string, header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(timeout: Option<Duration>) -> HttpTransport {
        let timeouts = TimeoutConfig {
            connect_secs: 2,
            token_secs: 0,
            upstream_secs: 0,
        };
        let mut transport = HttpTransport::new(&timeouts);
        transport.timeout = timeout;
        transport
    }

    #[tokio::test]
    async fn streams_request_and_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(query_param("x", "1"))
            .and(header_eq("x-custom", "yes"))
            .and(body_string("hello upstream"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-upstream", "1")
                    .set_body_string("created"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("{}/echo?x=1", server.uri()))
            .header("x-custom", "yes")
            .header(header::CONTENT_LENGTH, "14")
            .body(Body::from("hello upstream"))
            .unwrap();

        let response = transport(None).send(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-upstream"], "1");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"created");
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "https://elsewhere.example/"),
            )
            .mount(&server)
            .await;

        let request = Request::builder()
            .uri(format!("{}/old", server.uri()))
            .body(Body::empty())
            .unwrap();
        let response = transport(None).send(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()["location"], "https://elsewhere.example/");
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = Request::builder()
            .uri(format!("http://{}/", addr))
            .body(Body::empty())
            .unwrap();
        let err = transport(None).send(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let request = Request::builder()
            .uri(format!("{}/slow", server.uri()))
            .body(Body::empty())
            .unwrap();
        let err = transport(Some(Duration::from_millis(100)))
            .send(request)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Timeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn request_target_is_sent_verbatim() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let upstream = tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n")
                .await
                .unwrap();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        let request = Request::builder()
            .uri(format!("http://{}/api/../admin/%2e%2e/{{id}}?q='x'", addr))
            .body(Body::empty())
            .unwrap();
        let response = transport(None).send(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let head = upstream.await.unwrap();
        assert!(
            head.starts_with("GET /api/../admin/%2e%2e/{id}?q='x' HTTP/1.1\r\n"),
            "got {head}"
        );
    }
}
