//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listener.bind_address
//!     → listener.rs (parse, bind)
//!     → TcpListener handed to http::HttpServer
//! ```
//!
//! # Design Decisions
//! - A bind failure is one of the two process-fatal errors
//! - No TLS: the proxy listens on plain HTTP

pub mod listener;

pub use listener::{bind, ListenerError};
