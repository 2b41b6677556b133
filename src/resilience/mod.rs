//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Token fetch:
//!     → timeouts.rs (token deadline) → failure handled by the credential policy
//!
//! Request to upstream:
//!     → timeouts.rs (deadline until response headers) → 504 on expiry
//! ```
//!
//! # Design Decisions
//! - Every external call can carry a deadline, configured per call site
//! - No retries and no circuit breaking: a failed send fails that request only

pub mod timeouts;

pub use timeouts::{with_timeout, TimedOut};
