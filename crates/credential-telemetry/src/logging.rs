//! Structured logging helpers.
//!
//! Every credential-handler log line carries a `component` field so log
//! pipelines can split handler, router and window output.

use crate::{TelemetryConfig, TelemetryError};

/// Structured logger handle
pub struct StructuredLogger {
    json: bool,
}

impl StructuredLogger {
    /// Whether log lines are emitted as JSON.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Record the logging format in use.
///
/// Formatting itself is installed by the tracing subscriber.
pub fn init_logging(config: &TelemetryConfig) -> Result<StructuredLogger, TelemetryError> {
    tracing::debug!(
        json_logs = config.json_logs,
        console_output = config.console_output,
        "Structured logging configured"
    );

    Ok(StructuredLogger {
        json: config.json_logs,
    })
}

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a credential-event outcome with standard fields.
#[macro_export]
macro_rules! log_credential_event {
    ($level:ident, $component:expr, $msg:expr, $event_type:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            event_type = %$event_type,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a window-related event with standard fields.
#[macro_export]
macro_rules! log_window_event {
    ($level:ident, $component:expr, $msg:expr, $url:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            url = %$url,
            $($($field)*,)?
            $msg
        )
    };
}
