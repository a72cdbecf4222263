//! Handler Activator
//!
//! Binds application hooks to platform event types, connects to the
//! platform and dispatches every received event to the response resolver.
//!
//! ## Lifecycle
//!
//! 1. `bind` validates arguments and builds the `CredentialHandler`
//!    (no platform interaction yet)
//! 2. `connect` on the event source starts delivery
//! 3. a dispatch task spawns one resolution task per event
//!
//! A failing event only fails its own reply; the dispatch task keeps running
//! until the platform closes the stream or the `ActiveHandler` shuts down.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{
    CredentialEventType, HandlerError, IncomingCredentialEvent, MediatorOrigin,
};
use crate::ports::hook::CredentialHook;
use crate::ports::outbound::CredentialEventSource;
use crate::service::resolution::ResponseResolver;

/// Event type to hook, fixed at activation.
pub type ListenerMap = HashMap<CredentialEventType, Arc<dyn CredentialHook>>;

/// Arguments to `activate`.
#[derive(Clone)]
pub struct ActivationOptions {
    /// Origin allowed to deliver events.
    pub mediator_origin: String,
    /// Hook for request events.
    pub get: Option<Arc<dyn CredentialHook>>,
    /// Hook for store events.
    pub store: Option<Arc<dyn CredentialHook>>,
}

impl ActivationOptions {
    /// Options with no hooks bound yet.
    pub fn new(mediator_origin: impl Into<String>) -> Self {
        Self {
            mediator_origin: mediator_origin.into(),
            get: None,
            store: None,
        }
    }

    /// Bind the `get` hook.
    pub fn with_get(mut self, hook: Arc<dyn CredentialHook>) -> Self {
        self.get = Some(hook);
        self
    }

    /// Bind the `store` hook.
    pub fn with_store(mut self, hook: Arc<dyn CredentialHook>) -> Self {
        self.store = Some(hook);
        self
    }
}

/// Platform-facing handler scoped to one mediator origin.
pub struct CredentialHandler {
    mediator_origin: MediatorOrigin,
    listeners: ListenerMap,
}

impl CredentialHandler {
    /// Create a handler with no listeners.
    pub fn new(mediator_origin: MediatorOrigin) -> Self {
        Self {
            mediator_origin,
            listeners: HashMap::new(),
        }
    }

    /// Bind `hook` to `event_type`.
    ///
    /// The first binding wins; returns `false` if one already existed.
    pub fn add_event_listener(
        &mut self,
        event_type: CredentialEventType,
        hook: Arc<dyn CredentialHook>,
    ) -> bool {
        if self.listeners.contains_key(&event_type) {
            return false;
        }
        debug!(listener = event_type.listener_name(), "[ch] Listener bound");
        self.listeners.insert(event_type, hook);
        true
    }

    /// Hook bound to `event_type`.
    pub fn listener(&self, event_type: CredentialEventType) -> Option<&Arc<dyn CredentialHook>> {
        self.listeners.get(&event_type)
    }

    /// Origin this handler accepts events from.
    pub fn mediator_origin(&self) -> &MediatorOrigin {
        &self.mediator_origin
    }
}

/// Running handler returned by `activate`.
///
/// Dropping it stops the dispatch loop; replies already in flight still
/// complete.
pub struct ActiveHandler {
    mediator_origin: MediatorOrigin,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ActiveHandler {
    /// Origin the handler is connected for.
    pub fn mediator_origin(&self) -> &MediatorOrigin {
        &self.mediator_origin
    }

    /// Whether the dispatch loop is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop accepting events and wait for the dispatch loop to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "[ch] Dispatch loop ended abnormally");
        }
    }
}

/// Activates credential handlers against an event source.
pub struct HandlerActivator {
    events: Arc<dyn CredentialEventSource>,
    resolver: Arc<ResponseResolver>,
}

impl HandlerActivator {
    /// Create an activator.
    pub fn new(events: Arc<dyn CredentialEventSource>, resolver: ResponseResolver) -> Self {
        Self {
            events,
            resolver: Arc::new(resolver),
        }
    }

    /// Validate `options` and bind hooks. Performs no platform interaction.
    pub fn bind(options: ActivationOptions) -> Result<CredentialHandler, HandlerError> {
        if options.get.is_none() && options.store.is_none() {
            return Err(HandlerError::InvalidArgument(
                "\"get\" or \"store\" function(s) must be specified.".to_string(),
            ));
        }

        let origin = MediatorOrigin::parse(&options.mediator_origin)?;
        let mut handler = CredentialHandler::new(origin);

        if let Some(get) = options.get {
            handler.add_event_listener(CredentialEventType::Request, get);
        }
        if let Some(store) = options.store {
            handler.add_event_listener(CredentialEventType::Store, store);
        }

        Ok(handler)
    }

    /// Bind hooks, connect to the platform and start dispatching.
    pub async fn activate(&self, options: ActivationOptions) -> Result<ActiveHandler, HandlerError> {
        let handler = Self::bind(options)?;
        let mediator_origin = handler.mediator_origin().clone();

        let events = self.events.connect(&mediator_origin).await?;
        info!(mediator_origin = %mediator_origin, "[ch] Credential handler connected");

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(dispatch_loop(
            Arc::new(handler),
            events,
            self.resolver.clone(),
            shutdown_rx,
        ));

        Ok(ActiveHandler {
            mediator_origin,
            shutdown,
            task,
        })
    }
}

async fn dispatch_loop(
    handler: Arc<CredentialHandler>,
    mut events: mpsc::Receiver<IncomingCredentialEvent>,
    resolver: Arc<ResponseResolver>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!(mediator_origin = %handler.mediator_origin(), "[ch] Dispatch loop stopping");
                    break;
                }
            }
            incoming = events.recv() => {
                let Some(incoming) = incoming else {
                    info!(mediator_origin = %handler.mediator_origin(), "[ch] Platform closed event stream");
                    break;
                };
                dispatch(&handler, incoming, resolver.clone());
            }
        }
    }
}

fn dispatch(
    handler: &CredentialHandler,
    incoming: IncomingCredentialEvent,
    resolver: Arc<ResponseResolver>,
) {
    let (event, responder, windows) = incoming.into_parts();
    let event_type = event.event_type;
    let hook = handler.listener(event_type).cloned();

    tokio::spawn(async move {
        let committed = responder
            .respond_with(async {
                match hook {
                    Some(hook) => resolver.resolve(hook.as_ref(), event, windows.as_ref()).await,
                    None => {
                        warn!(listener = event_type.listener_name(), "[ch] No listener bound");
                        Err(HandlerError::NoListener(event_type))
                    }
                }
            })
            .await;

        if !committed {
            debug!(event_type = %event_type, "[ch] Platform stopped waiting for reply");
        }
    });
}
