//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logs, traces and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for traces and logs
    pub service_name: String,

    /// OpenTelemetry OTLP endpoint
    pub otlp_endpoint: String,

    /// Whether spans are exported over OTLP
    pub otlp_enabled: bool,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output (for development)
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Prometheus metrics port
    pub metrics_port: u16,

    /// Deployment environment (development, staging, production)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "credential-handler".to_string(),
            otlp_endpoint: "http://localhost:4317".to_string(),
            otlp_enabled: false,
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_port: 9100,
            environment: "development".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: credential-handler)
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: http://localhost:4317)
    /// - `CH_OTLP_ENABLED`: Export spans over OTLP (default: false)
    /// - `CH_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CH_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CH_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `CH_METRICS_PORT`: Prometheus metrics port (default: 9100)
    /// - `CH_ENVIRONMENT`: Deployment environment (default: development)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "credential-handler".to_string()),

            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),

            otlp_enabled: env::var("CH_OTLP_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),

            log_level: env::var("CH_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("CH_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("CH_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            metrics_port: env::var("CH_METRICS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(9100),

            environment: env::var("CH_ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Configuration for a named component, e.g. `runtime` or `wallet-window`.
    pub fn for_component(component: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("{}-{}", config.service_name, component);
        config
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
