//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticating transport produces:
//!     → access_log.rs (one line per upstream response)
//!     → metrics.rs (request counters, latency histogram)
//!     → a `credentials` error line per failed token fetch
//!
//! Consumers:
//!     → logging.rs (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows from the front end to the upstream
//! - Metrics are cheap (atomic increments)

pub mod access_log;
pub mod logging;
pub mod metrics;

pub use access_log::{AccessLogRecord, ACCESS_LOG_TARGET};

/// `tracing` target of credential failure lines.
pub const CREDENTIALS_TARGET: &str = "credentials";
