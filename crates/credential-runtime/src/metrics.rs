//! Prometheus-backed `MetricsRecorder`.

use std::time::Duration;

use credential_handler::{CredentialEventType, MetricsRecorder};
use credential_telemetry::{
    metric_inc, metric_observe, CREDENTIAL_EVENTS, EVENT_FAILURES, INLINE_REPLIES,
    REDIRECTS_COMPLETED, REDIRECTS_STARTED, REDIRECT_DURATION,
};

/// Forwards handler metrics to the global Prometheus registry.
#[derive(Default)]
pub struct PrometheusMetrics;

impl MetricsRecorder for PrometheusMetrics {
    fn record_event(&self, event_type: CredentialEventType) {
        metric_inc!(CREDENTIAL_EVENTS, &[event_type.hook_name()]);
    }

    fn record_inline_reply(&self) {
        metric_inc!(INLINE_REPLIES);
    }

    fn record_redirect_started(&self) {
        metric_inc!(REDIRECTS_STARTED);
    }

    fn record_redirect_completed(&self, duration: Duration) {
        metric_inc!(REDIRECTS_COMPLETED);
        metric_observe!(REDIRECT_DURATION, duration.as_secs_f64());
    }

    fn record_failure(&self, kind: &str) {
        metric_inc!(EVENT_FAILURES, &[kind]);
    }
}
