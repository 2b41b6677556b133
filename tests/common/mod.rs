//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Method, Request, Response, StatusCode};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use idtoken_proxy::auth::{Audience, CredentialError, Token, TokenProvider};
use idtoken_proxy::config::TimeoutConfig;
use idtoken_proxy::routing::{ForwardedProto, RequestRewriter, Upstream};
use idtoken_proxy::transport::{AuthenticatingTransport, CredentialPolicy, HttpTransport};
use idtoken_proxy::{Forwarder, HttpServer, Shutdown};

/// A request as the backend received it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Backend that records every request and answers `200 hello`.
///
/// Requests to `/slow` are answered after two seconds.
pub struct RecordingBackend {
    pub addr: SocketAddr,
    seen: Arc<Mutex<Vec<Captured>>>,
}

impl RecordingBackend {
    pub async fn start() -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();

        let app = Router::new().fallback(move |request: Request<Body>| {
            let recorder = recorder.clone();
            async move {
                let (parts, body) = request.into_parts();
                let slow = parts.uri.path() == "/slow";
                let body = to_bytes(body, usize::MAX).await.unwrap().to_vec();
                recorder.lock().unwrap().push(Captured {
                    method: parts.method,
                    uri: parts.uri.to_string(),
                    headers: parts.headers,
                    body,
                });
                if slow {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
                Response::builder()
                    .status(StatusCode::OK)
                    .header("x-backend", "recorded")
                    .body(Body::from("hello"))
                    .unwrap()
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, seen }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.seen.lock().unwrap().clone()
    }
}

/// Hands out `token-1`, `token-2`, ... and remembers the audiences.
#[derive(Default)]
pub struct CountingTokens {
    calls: AtomicUsize,
    pub audiences: Mutex<Vec<String>>,
}

#[async_trait]
impl TokenProvider for CountingTokens {
    async fn token(&self, audience: &Audience) -> Result<Token, CredentialError> {
        self.audiences.lock().unwrap().push(audience.to_string());
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Token::new(format!("token-{}", n))
    }
}

/// Token source that is never reachable.
pub struct UnavailableTokens;

#[async_trait]
impl TokenProvider for UnavailableTokens {
    async fn token(&self, _audience: &Audience) -> Result<Token, CredentialError> {
        Err(CredentialError::Unavailable("no metadata server".to_string()))
    }
}

/// Raw TCP backend that answers every connection with `response` verbatim.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Raw TCP backend that answers `204` and reports each request head it read.
pub async fn start_capturing_backend() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
                let _ = socket
                    .write_all(b"HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// Send `GET <target>` over a raw connection, bypassing any client-side URL
/// normalization, and return the response status line.
pub async fn raw_get(addr: SocketAddr, target: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: proxy.test\r\nConnection: close\r\n\r\n",
        target
    );
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    socket.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response)
        .lines()
        .next()
        .unwrap_or("")
        .to_string()
}

/// A proxy running on an ephemeral port.
pub struct RunningProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn stop(&self) {
        self.shutdown.trigger();
    }
}

/// Start a proxy in front of `upstream` using `tokens` for credentials.
pub async fn start_proxy(
    upstream: &str,
    tokens: Arc<dyn TokenProvider>,
    policy: CredentialPolicy,
    timeouts: TimeoutConfig,
) -> RunningProxy {
    let rewriter = RequestRewriter::new(Upstream::parse(upstream).unwrap(), ForwardedProto::Inbound);
    let transport = AuthenticatingTransport::new(HttpTransport::new(&timeouts), tokens, policy);
    let server = HttpServer::new(Forwarder::new(rewriter, transport));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    RunningProxy { addr, shutdown }
}

/// Plain client that never follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// An address nothing listens on.
pub async fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
