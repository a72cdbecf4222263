//! In-Process Platform Adapters
//!
//! Permission gate, handler registry and credential-event delivery backed by
//! process memory. Used by the runtime binary and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use url::Url;

use crate::domain::{
    CredentialEvent, EventResponder, HandlerError, IncomingCredentialEvent, MediatorOrigin,
    PermissionState, PlatformError, Registration, RegistryError, ReplyResult,
};
use crate::ports::outbound::{CredentialEventSource, HandlerRegistry, PermissionGate, WindowOpener};

/// Permission gate that always answers with a configured state.
pub struct StaticPermissionGate {
    state: RwLock<PermissionState>,
    prompts: AtomicUsize,
}

impl StaticPermissionGate {
    /// Gate answering `state`.
    pub fn new(state: PermissionState) -> Self {
        Self {
            state: RwLock::new(state),
            prompts: AtomicUsize::new(0),
        }
    }

    /// Gate that grants every request.
    pub fn granted() -> Self {
        Self::new(PermissionState::Granted)
    }

    /// Change the answer for later prompts.
    pub fn set_state(&self, state: PermissionState) {
        *self.state.write() = state;
    }

    /// Number of prompts shown so far.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionGate for StaticPermissionGate {
    async fn request_permission(&self) -> PermissionState {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        *self.state.read()
    }
}

/// Registry keeping registrations in a map keyed by handler URL.
#[derive(Default)]
pub struct InMemoryHandlerRegistry {
    registrations: RwLock<HashMap<Url, Registration>>,
    unavailable: AtomicBool,
    register_calls: AtomicUsize,
    unregister_calls: AtomicUsize,
}

impl InMemoryHandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later operation fail with `RegistryError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `register` calls, including failed ones.
    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    /// Number of `unregister` calls, including failed ones.
    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    /// Whether `url` is currently registered.
    pub fn is_registered(&self, url: &Url) -> bool {
        self.registrations.read().contains_key(url)
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    fn check_available(&self) -> Result<(), RegistryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("registry offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HandlerRegistry for InMemoryHandlerRegistry {
    async fn register(&self, url: &Url) -> Result<Registration, RegistryError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut registrations = self.registrations.write();
        let registration = registrations
            .entry(url.clone())
            .or_insert_with(|| Registration::new(url.clone()))
            .clone();

        debug!(url = %url, registration = %registration.id(), "[ch] Handler registered");
        Ok(registration)
    }

    async fn unregister(&self, url: &Url) -> Result<(), RegistryError> {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        self.registrations
            .write()
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(url.to_string()))
    }
}

/// Event source fed by the host through `dispatch`.
///
/// Every event carries the same window opener, standing in for the
/// platform's `openWindow`.
pub struct ChannelEventSource {
    windows: Arc<dyn WindowOpener>,
    sender: Mutex<Option<mpsc::Sender<IncomingCredentialEvent>>>,
    receiver: Mutex<Option<mpsc::Receiver<IncomingCredentialEvent>>>,
    origin: RwLock<Option<MediatorOrigin>>,
    connect_calls: AtomicUsize,
}

impl ChannelEventSource {
    /// Source buffering up to `capacity` undelivered events.
    pub fn new(windows: Arc<dyn WindowOpener>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            windows,
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            origin: RwLock::new(None),
            connect_calls: AtomicUsize::new(0),
        }
    }

    /// Number of `connect` attempts.
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Origin of the connected handler, if any.
    pub fn connected_origin(&self) -> Option<MediatorOrigin> {
        self.origin.read().clone()
    }

    /// Deliver `event` and return the receiver its reply lands on.
    pub async fn dispatch(
        &self,
        event: CredentialEvent,
    ) -> Result<oneshot::Receiver<ReplyResult>, PlatformError> {
        let sender = self.sender.lock().clone().ok_or(PlatformError::Closed)?;

        let (responder, reply) = EventResponder::channel();
        let incoming = IncomingCredentialEvent::new(event, responder, self.windows.clone());
        sender
            .send(incoming)
            .await
            .map_err(|_| PlatformError::Closed)?;

        Ok(reply)
    }

    /// Deliver `event` and wait for its reply.
    pub async fn request(&self, event: CredentialEvent) -> ReplyResult {
        let reply = self.dispatch(event).await?;
        reply
            .await
            .map_err(|_| HandlerError::Platform(PlatformError::Closed))?
    }

    /// Stop delivering events. The connected handler sees the stream end.
    pub fn close(&self) {
        if self.sender.lock().take().is_some() {
            info!("[ch] Event source closed");
        }
    }
}

#[async_trait]
impl CredentialEventSource for ChannelEventSource {
    async fn connect(
        &self,
        mediator_origin: &MediatorOrigin,
    ) -> Result<mpsc::Receiver<IncomingCredentialEvent>, PlatformError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        let receiver = self
            .receiver
            .lock()
            .take()
            .ok_or(PlatformError::AlreadyConnected)?;
        *self.origin.write() = Some(mediator_origin.clone());

        debug!(mediator_origin = %mediator_origin, "[ch] Event source connected");
        Ok(receiver)
    }
}
