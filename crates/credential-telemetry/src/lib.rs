//! # Credential Telemetry
//!
//! Observability stack for the credential handler.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` console output, pretty or JSON
//! - **Traces**: optional OpenTelemetry OTLP export
//! - **Metrics**: Prometheus counters for events, redirects and failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use credential_telemetry::{TelemetryConfig, init_telemetry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).await.expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | `http://localhost:4317` | OTLP endpoint |
//! | `OTEL_SERVICE_NAME` | `credential-handler` | Service name in traces |
//! | `CH_OTLP_ENABLED` | `false` | Export spans over OTLP |
//! | `CH_LOG_LEVEL` | `info` | Log level filter |
//! | `CH_JSON_LOGS` | `false` | JSON log lines |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use logging::StructuredLogger;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, CREDENTIAL_EVENTS, EVENT_FAILURES,
    INLINE_REPLIES, REDIRECTS_COMPLETED, REDIRECTS_STARTED, REDIRECT_DURATION,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Subscriber or OTLP pipeline could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    TracerInit(String),

    /// Prometheus registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Configuration could not be applied.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging, tracing and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
/// When dropped, it flushes pending spans.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Initialize metrics first (synchronous)
    let metrics_handle = register_metrics()?;

    let tracing_guard = tracing_setup::init_tracing(&config).await?;
    let logger = logging::init_logging(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
        metrics: metrics_handle,
        logger,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shutdown.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    metrics: MetricsHandle,
    logger: StructuredLogger,
}

impl TelemetryGuard {
    /// Metrics registry handle.
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }

    /// Logging format in use.
    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Span carrying the handler component name.
///
/// # Example
///
/// ```rust,ignore
/// use credential_telemetry::component_span;
///
/// let _span = component_span!("activate", component = "runtime", origin = "https://mediator.example");
/// ```
#[macro_export]
macro_rules! component_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

/// Convenience macro for recording a metric with a value.
#[macro_export]
macro_rules! metric_observe {
    ($metric:expr, $value:expr) => {
        $metric.observe($value)
    };
    ($metric:expr, $labels:expr, $value:expr) => {
        $metric.with_label_values($labels).observe($value)
    };
}
