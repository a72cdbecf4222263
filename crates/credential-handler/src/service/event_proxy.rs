//! Event Proxy Endpoint
//!
//! Window-side counterpart of the redirect router. A window opened by a
//! redirect exposes the `send` function, receives the forwarded event and
//! answers it as if the platform had delivered it directly.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::config::{HandlerConfig, DEFAULT_PROXY_SERVICE, SEND_FUNCTION};
use crate::domain::{CredentialEvent, CredentialReply, HookError, RpcError};
use crate::ports::outbound::{RemoteService, RpcServer};

type ProxyReply = Result<CredentialReply, HookError>;

/// Event forwarded into a window, with its reply capability.
#[derive(Debug)]
pub struct ProxiedCredentialEvent {
    /// Event exactly as the handler received it.
    pub event: CredentialEvent,
    responder: oneshot::Sender<ProxyReply>,
}

impl ProxiedCredentialEvent {
    /// Await `reply` and send it back to the opener.
    ///
    /// Returns `false` if the opener is no longer waiting.
    pub async fn respond_with<F>(self, reply: F) -> bool
    where
        F: Future<Output = ProxyReply>,
    {
        let outcome = reply.await;
        self.responder.send(outcome).is_ok()
    }
}

/// The `send` function. Delivers only the first event.
struct SendService {
    service: String,
    events: Mutex<Option<oneshot::Sender<ProxiedCredentialEvent>>>,
}

#[async_trait]
impl RemoteService for SendService {
    async fn invoke(&self, function: &str, args: Value) -> Result<Value, RpcError> {
        if function != SEND_FUNCTION {
            return Err(RpcError::UnknownFunction {
                service: self.service.clone(),
                function: function.to_string(),
            });
        }

        let event: CredentialEvent =
            serde_json::from_value(args).map_err(|e| RpcError::Codec(e.to_string()))?;

        let Some(events) = self.events.lock().take() else {
            return Err(RpcError::Remote(
                "credential event already delivered".to_string(),
            ));
        };

        let (responder, reply) = oneshot::channel();
        debug!(event_type = %event.event_type, "[ch] Proxied event received");
        events
            .send(ProxiedCredentialEvent { event, responder })
            .map_err(|_| RpcError::ChannelClosed("window stopped listening".to_string()))?;

        match reply.await {
            Ok(Ok(reply)) => Ok(reply.into_value()),
            Ok(Err(e)) => Err(RpcError::Remote(e.to_string())),
            Err(_) => Err(RpcError::ChannelClosed(
                "window dropped the event without replying".to_string(),
            )),
        }
    }
}

/// Receives one credential event inside a redirect window.
pub struct CredentialEventProxy {
    server: Arc<dyn RpcServer>,
    service_name: String,
}

impl CredentialEventProxy {
    /// Endpoint on the window's RPC server.
    pub fn new(server: Arc<dyn RpcServer>) -> Self {
        Self {
            server,
            service_name: DEFAULT_PROXY_SERVICE.to_string(),
        }
    }

    /// Expose the endpoint under a different service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Expose `send`, connect, and wait for the opener to forward an event.
    pub async fn receive(self) -> Result<ProxiedCredentialEvent, RpcError> {
        let (events, received) = oneshot::channel();
        let service = SendService {
            service: self.service_name.clone(),
            events: Mutex::new(Some(events)),
        };

        self.server.define(&self.service_name, Arc::new(service));
        self.server.connect().await?;
        info!(service = %self.service_name, "[ch] Event proxy listening");

        received
            .await
            .map_err(|_| RpcError::ChannelClosed("opener never sent an event".to_string()))
    }
}

/// Receive the credential event forwarded into this window.
pub async fn receive_credential_event(
    server: Arc<dyn RpcServer>,
) -> Result<ProxiedCredentialEvent, RpcError> {
    CredentialEventProxy::new(server).receive().await
}

/// Like `receive_credential_event`, exposing the service name the opener
/// was configured with.
pub async fn receive_credential_event_with(
    server: Arc<dyn RpcServer>,
    config: &HandlerConfig,
) -> Result<ProxiedCredentialEvent, RpcError> {
    CredentialEventProxy::new(server)
        .with_service_name(config.proxy_service_name.as_str())
        .receive()
        .await
}
