//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the token fetch and the upstream send independently
//! - Cancel the wrapped operation cleanly on timeout (the future is dropped)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - `None` means no deadline, matching a `0` in configuration
//! - Timeout errors are distinct from other errors so the caller can map them to 504

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The operation did not finish within its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {0:?}")]
pub struct TimedOut(pub Duration);

/// Run `future`, giving up after `limit` when one is set.
pub async fn with_timeout<F>(limit: Option<Duration>, future: F) -> Result<F::Output, TimedOut>
where
    F: Future,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| TimedOut(limit)),
        None => Ok(future.await),
    }
}
