//! Remote Proxy
//!
//! Local stand-in for a service exposed inside another context. Every
//! function the proxy may call is declared up front with its own deadline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::domain::RpcError;
use crate::ports::outbound::Injector;

/// Deadline for one remote function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallTimeout {
    /// Use the proxy's default deadline.
    #[default]
    Default,
    /// Fail after the given duration.
    After(Duration),
    /// Wait as long as the remote side needs (human-interactive calls).
    Unbounded,
}

impl CallTimeout {
    /// Effective deadline, `None` meaning no deadline at all.
    pub fn resolve(&self, default: Duration) -> Option<Duration> {
        match self {
            CallTimeout::Default => Some(default),
            CallTimeout::After(limit) => Some(*limit),
            CallTimeout::Unbounded => None,
        }
    }
}

/// Declaration of a callable remote function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFunction {
    name: String,
    timeout: CallTimeout,
}

impl RemoteFunction {
    /// Declare `name` with the default deadline.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout: CallTimeout::Default,
        }
    }

    /// Override the deadline.
    pub fn with_timeout(mut self, timeout: CallTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    /// Function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured deadline.
    pub fn timeout(&self) -> CallTimeout {
        self.timeout
    }
}

/// Callable proxy for one remote service.
pub struct RemoteProxy {
    injector: Arc<dyn Injector>,
    service: String,
    functions: HashMap<String, CallTimeout>,
    default_timeout: Duration,
}

impl RemoteProxy {
    /// Acquire a proxy for `service` exposing only `functions`.
    pub fn new(
        injector: Arc<dyn Injector>,
        service: impl Into<String>,
        functions: impl IntoIterator<Item = RemoteFunction>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            injector,
            service: service.into(),
            functions: functions
                .into_iter()
                .map(|f| (f.name, f.timeout))
                .collect(),
            default_timeout,
        }
    }

    /// Service name this proxy targets.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Call a declared function.
    pub async fn call(&self, function: &str, args: Value) -> Result<Value, RpcError> {
        let timeout = self
            .functions
            .get(function)
            .ok_or_else(|| RpcError::UnknownFunction {
                service: self.service.clone(),
                function: function.to_string(),
            })?;

        let call = self.injector.call(&self.service, function, args);
        match timeout.resolve(self.default_timeout) {
            None => {
                debug!(service = %self.service, function, "[ch] Remote call without deadline");
                call.await
            }
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                RpcError::Timeout {
                    function: function.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                }
            })?,
        }
    }
}
