//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     upstream.url
//!     → upstream.rs (parse & validate, fatal on error)
//!     → Frozen as immutable Upstream
//!
//! Per request:
//!     Inbound Request (host, path, query, headers)
//!     → rewriter.rs (swap scheme/authority, forwarding headers)
//!     → Outbound Request for the transport
//! ```
//!
//! # Design Decisions
//! - Exactly one upstream; every path is forwarded, there is no route table
//! - Upstream parsed at startup, immutable at runtime
//! - Deterministic: same input always produces the same outbound URI

pub mod rewriter;
pub mod upstream;

pub use rewriter::{ForwardedProto, RequestRewriter, RewriteError};
pub use upstream::{Upstream, UpstreamError};
