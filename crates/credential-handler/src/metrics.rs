//! Metrics hooks for credential event handling
//!
//! Counts events, inline replies, redirects and per-event failures. The
//! resolver reports through `MetricsRecorder`, so hosts can forward to
//! Prometheus or any other backend.
//!
//! ## Usage
//!
//! ```ignore
//! use credential_handler::metrics::{Metrics, MetricsRecorder};
//!
//! let metrics = Metrics::new();
//! metrics.record_event(CredentialEventType::Request);
//! metrics.record_inline_reply();
//! assert_eq!(metrics.snapshot().inline_replies, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::domain::CredentialEventType;

/// Metrics collector for credential events
#[derive(Default)]
pub struct Metrics {
    /// Request events received
    pub requests_received: AtomicU64,
    /// Store events received
    pub stores_received: AtomicU64,
    /// Events answered without a window
    pub inline_replies: AtomicU64,
    /// Redirects started
    pub redirects_started: AtomicU64,
    /// Redirects that produced a reply
    pub redirects_completed: AtomicU64,
    /// Events that resolved to an error
    pub failures: AtomicU64,
    /// Cumulative redirect round-trip time in milliseconds
    pub redirect_time_ms: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received event
    pub fn record_event(&self, event_type: CredentialEventType) {
        match event_type {
            CredentialEventType::Request => self.requests_received.fetch_add(1, Ordering::Relaxed),
            CredentialEventType::Store => self.stores_received.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record an inline reply
    pub fn record_inline_reply(&self) {
        self.inline_replies.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the start of a redirect
    pub fn record_redirect_started(&self) {
        self.redirects_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed redirect
    pub fn record_redirect_completed(&self, duration: Duration) {
        self.redirects_completed.fetch_add(1, Ordering::Relaxed);
        self.redirect_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed event
    pub fn record_failure(&self, _kind: &str) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            stores_received: self.stores_received.load(Ordering::Relaxed),
            inline_replies: self.inline_replies.load(Ordering::Relaxed),
            redirects_started: self.redirects_started.load(Ordering::Relaxed),
            redirects_completed: self.redirects_completed.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            avg_redirect_ms: self.avg_redirect_time_ms(),
        }
    }

    /// Average redirect round-trip in milliseconds
    pub fn avg_redirect_time_ms(&self) -> u64 {
        let total = self.redirect_time_ms.load(Ordering::Relaxed);
        let count = self.redirects_completed.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Request events received
    pub requests_received: u64,
    /// Store events received
    pub stores_received: u64,
    /// Events answered without a window
    pub inline_replies: u64,
    /// Redirects started
    pub redirects_started: u64,
    /// Redirects that produced a reply
    pub redirects_completed: u64,
    /// Events that resolved to an error
    pub failures: u64,
    /// Average redirect round-trip in milliseconds
    pub avg_redirect_ms: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus or OpenTelemetry.
pub trait MetricsRecorder: Send + Sync {
    /// Record a received event
    fn record_event(&self, event_type: CredentialEventType);

    /// Record an inline reply
    fn record_inline_reply(&self);

    /// Record the start of a redirect
    fn record_redirect_started(&self);

    /// Record a completed redirect
    fn record_redirect_completed(&self, duration: Duration);

    /// Record a failed event, labelled by `HandlerError::kind`
    fn record_failure(&self, kind: &str);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_event(&self, _: CredentialEventType) {}
    fn record_inline_reply(&self) {}
    fn record_redirect_started(&self) {}
    fn record_redirect_completed(&self, _: Duration) {}
    fn record_failure(&self, _: &str) {}
}

impl MetricsRecorder for Metrics {
    fn record_event(&self, event_type: CredentialEventType) {
        Metrics::record_event(self, event_type);
    }

    fn record_inline_reply(&self) {
        Metrics::record_inline_reply(self);
    }

    fn record_redirect_started(&self) {
        Metrics::record_redirect_started(self);
    }

    fn record_redirect_completed(&self, duration: Duration) {
        Metrics::record_redirect_completed(self, duration);
    }

    fn record_failure(&self, kind: &str) {
        Metrics::record_failure(self, kind);
    }
}
