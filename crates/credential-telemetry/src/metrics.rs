//! Prometheus metrics for the credential handler.
//!
//! All metrics follow the naming convention: `ch_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., events_received_total)
//! - **Histogram**: Distribution of values (e.g., redirect_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // EVENT METRICS
    // =========================================================================

    /// Credential events received, by type
    pub static ref CREDENTIAL_EVENTS: CounterVec = CounterVec::new(
        Opts::new("ch_events_received_total", "Credential events received"),
        &["event_type"]  // request / store
    ).expect("metric creation failed");

    /// Events answered without opening a window
    pub static ref INLINE_REPLIES: Counter = Counter::new(
        "ch_events_inline_replies_total",
        "Credential events answered inline"
    ).expect("metric creation failed");

    /// Event failures by error kind
    pub static ref EVENT_FAILURES: CounterVec = CounterVec::new(
        Opts::new("ch_events_failures_total", "Credential events that resolved to an error"),
        &["kind"]
    ).expect("metric creation failed");

    // =========================================================================
    // REDIRECT METRICS
    // =========================================================================

    /// Redirects started
    pub static ref REDIRECTS_STARTED: Counter = Counter::new(
        "ch_redirect_started_total",
        "Redirects into a window that were started"
    ).expect("metric creation failed");

    /// Redirects that produced a reply
    pub static ref REDIRECTS_COMPLETED: Counter = Counter::new(
        "ch_redirect_completed_total",
        "Redirects that returned a window reply"
    ).expect("metric creation failed");

    /// Redirect round-trip time, window open to reply
    pub static ref REDIRECT_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ch_redirect_duration_seconds",
            "Time from window open to window reply"
        ).buckets(exponential_buckets(0.001, 2.0, 18).unwrap_or_default())
    ).expect("metric creation failed");
}

/// Handle for the metrics registry
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Registry the metrics were registered with.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Events
        Box::new(CREDENTIAL_EVENTS.clone()),
        Box::new(INLINE_REPLIES.clone()),
        Box::new(EVENT_FAILURES.clone()),
        // Redirects
        Box::new(REDIRECTS_STARTED.clone()),
        Box::new(REDIRECTS_COMPLETED.clone()),
        Box::new(REDIRECT_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
