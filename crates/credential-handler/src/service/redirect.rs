//! Redirect Router
//!
//! Moves one credential event into a window and returns the window's reply.
//!
//! The handshake has two phases, both initiated together:
//! 1. open: the platform starts loading the window
//! 2. ready: the window's RPC channel accepts calls
//!
//! Open is always awaited before ready. If opening fails, the ready future
//! is dropped without being polled.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, info};
use url::Url;

use crate::config::{HandlerConfig, SEND_FUNCTION};
use crate::domain::{CredentialEvent, CredentialReply, RedirectError, RpcError};
use crate::metrics::MetricsRecorder;
use crate::ports::outbound::{WindowConnector, WindowOpener};
use crate::rpc::{CallTimeout, RemoteFunction, RemoteProxy};

/// Redirects credential events into windows.
pub struct RedirectRouter {
    connector: Arc<dyn WindowConnector>,
    service_name: String,
    default_timeout: Duration,
    metrics: Arc<dyn MetricsRecorder>,
}

impl RedirectRouter {
    /// Create a router that reaches windows through `connector`.
    pub fn new(
        connector: Arc<dyn WindowConnector>,
        config: &HandlerConfig,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            connector,
            service_name: config.proxy_service_name.clone(),
            default_timeout: config.rpc_call_timeout,
            metrics,
        }
    }

    /// Open a window at `url`, forward `event` to it and return its reply.
    pub async fn redirect(
        &self,
        url: &Url,
        event: &CredentialEvent,
        windows: &dyn WindowOpener,
    ) -> Result<CredentialReply, RedirectError> {
        self.metrics.record_redirect_started();
        let started = Instant::now();

        let window_open = windows.open_window(url).shared();
        let window_ready = self.connector.create_window(url, window_open.clone());

        let handle = window_open.await?;
        debug!(window = %handle.id(), url = %url, "[ch] Window opened");

        let injector = window_ready.await?;
        debug!(window = %handle.id(), "[ch] Window channel ready");

        // The window may wait on the user indefinitely.
        let proxy = RemoteProxy::new(
            injector,
            self.service_name.as_str(),
            [RemoteFunction::new(SEND_FUNCTION).with_timeout(CallTimeout::Unbounded)],
            self.default_timeout,
        );

        let payload =
            serde_json::to_value(event).map_err(|e| RpcError::Codec(e.to_string()))?;
        let reply = CredentialReply::from_value(proxy.call(SEND_FUNCTION, payload).await?);

        let elapsed = started.elapsed();
        self.metrics.record_redirect_completed(elapsed);
        info!(
            window = %handle.id(),
            data_type = ?reply.data_type(),
            elapsed_ms = elapsed.as_millis() as u64,
            "[ch] Window replied"
        );

        Ok(reply)
    }
}
