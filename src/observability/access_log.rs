//! Access log records.
//!
//! One record per request whose upstream send produced a response.

use std::time::Duration;

use axum::http::{Method, StatusCode};

/// `tracing` target of access log lines.
pub const ACCESS_LOG_TARGET: &str = "access_log";

/// Outcome of one forwarded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLogRecord {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub duration: Duration,
}

impl AccessLogRecord {
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Elapsed time in whole milliseconds.
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn emit(&self) {
        tracing::info!(
            target: ACCESS_LOG_TARGET,
            method = %self.method,
            url = %self.url,
            status = self.status.as_u16(),
            status_text = self.status_text(),
            duration_ms = self.duration_ms(),
            "{} {} {} {}, duration: {}ms",
            self.method,
            self.url,
            self.status.as_u16(),
            self.status_text(),
            self.duration_ms(),
        );
    }
}
