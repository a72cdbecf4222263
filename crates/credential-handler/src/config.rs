//! Handler configuration from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Service name the window endpoint exposes.
pub const DEFAULT_PROXY_SERVICE: &str = "credentialEventProxy";

/// Function the window endpoint exposes.
pub const SEND_FUNCTION: &str = "send";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Event channel capacity must be positive.
    #[error("event channel capacity must be greater than zero")]
    ZeroChannelCapacity,

    /// Proxy service name must be set.
    #[error("proxy service name must not be empty")]
    EmptyServiceName,
}

/// Configuration for the credential handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Default deadline for remote calls that do not opt out.
    pub rpc_call_timeout: Duration,

    /// Buffer between the platform and the dispatch loop.
    pub event_channel_capacity: usize,

    /// Service name exposed by the window endpoint.
    pub proxy_service_name: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            rpc_call_timeout: Duration::from_secs(30),
            event_channel_capacity: 64,
            proxy_service_name: DEFAULT_PROXY_SERVICE.to_string(),
        }
    }
}

impl HandlerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CH_RPC_CALL_TIMEOUT_MS`: Default remote-call deadline (default: 30000)
    /// - `CH_EVENT_CHANNEL_CAPACITY`: Event buffer size (default: 64)
    /// - `CH_PROXY_SERVICE_NAME`: Window endpoint service (default: credentialEventProxy)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            rpc_call_timeout: env::var("CH_RPC_CALL_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.rpc_call_timeout),

            event_channel_capacity: env::var("CH_EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.event_channel_capacity),

            proxy_service_name: env::var("CH_PROXY_SERVICE_NAME")
                .unwrap_or(defaults.proxy_service_name),
        }
    }

    /// Reject settings the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::ZeroChannelCapacity);
        }
        if self.proxy_service_name.trim().is_empty() {
            return Err(ConfigError::EmptyServiceName);
        }
        Ok(())
    }
}
