//! # Outbound Ports
//!
//! Traits for the platform collaborators: permission prompt, handler
//! registry, credential-event delivery, windows, and the remote-call
//! transport into a window.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use tokio::sync::mpsc;
use url::Url;
use uuid::Uuid;

use crate::domain::{
    IncomingCredentialEvent, MediatorOrigin, PermissionState, PlatformError, RedirectError,
    Registration, RegistryError, RpcError,
};

/// Permission prompt for managing credential hints - outbound port.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Ask whether the caller may manage credential hints.
    async fn request_permission(&self) -> PermissionState;
}

/// Handler URL registry - outbound port.
#[async_trait]
pub trait HandlerRegistry: Send + Sync {
    /// Register a handler URL.
    async fn register(&self, url: &Url) -> Result<Registration, RegistryError>;

    /// Remove a handler URL registration.
    async fn unregister(&self, url: &Url) -> Result<(), RegistryError>;
}

/// Credential-event delivery - outbound port.
#[async_trait]
pub trait CredentialEventSource: Send + Sync {
    /// Connect a handler scoped to `mediator_origin`.
    ///
    /// Events arrive on the returned receiver until the platform closes it.
    async fn connect(
        &self,
        mediator_origin: &MediatorOrigin,
    ) -> Result<mpsc::Receiver<IncomingCredentialEvent>, PlatformError>;
}

/// Handle of an opened window.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle {
    id: Uuid,
    url: Url,
}

impl WindowHandle {
    /// Create a handle for a window loaded at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
        }
    }

    /// Window id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Location the window was opened at.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Pending "window opened" signal.
pub type WindowOpenFuture = BoxFuture<'static, Result<WindowHandle, RedirectError>>;

/// Open signal shared between the router and the connector.
pub type WindowOpening = Shared<WindowOpenFuture>;

/// Pending "window ready for RPC" signal.
pub type WindowReadyFuture = BoxFuture<'static, Result<Arc<dyn Injector>, RedirectError>>;

/// Opens windows for one credential interaction - outbound port.
///
/// Returns an unpolled future so the caller controls when opening is
/// awaited.
pub trait WindowOpener: Send + Sync {
    /// Begin opening a window at `url`.
    fn open_window(&self, url: &Url) -> WindowOpenFuture;
}

/// Establishes remote-call channels into windows - outbound port.
pub trait WindowConnector: Send + Sync {
    /// Begin connecting to the window produced by `opening`.
    ///
    /// The returned future resolves once the window exposes its services.
    fn create_window(&self, url: &Url, opening: WindowOpening) -> WindowReadyFuture;
}

/// Caller side of a ready remote-call channel.
#[async_trait]
pub trait Injector: Send + Sync {
    /// Invoke `service.function(args)` inside the remote context.
    async fn call(&self, service: &str, function: &str, args: Value) -> Result<Value, RpcError>;
}

/// Service exposed over a remote-call channel.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Handle an incoming call.
    async fn invoke(&self, function: &str, args: Value) -> Result<Value, RpcError>;
}

/// Callee side of a remote-call channel, living inside a window.
#[async_trait]
pub trait RpcServer: Send + Sync {
    /// Expose `service` under `name`.
    fn define(&self, name: &str, service: Arc<dyn RemoteService>);

    /// Signal the opener that defined services are callable.
    async fn connect(&self) -> Result<(), RpcError>;
}
