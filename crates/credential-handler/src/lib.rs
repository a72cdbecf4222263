//! # Credential Handler
//!
//! Lets an application act as a credential handler: it registers a handler
//! URL, binds `get` and `store` hooks to platform credential events, and
//! answers each event either inline or by redirecting it into a window.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Event Flow
//!
//! ```text
//! platform event ──→ HandlerActivator ──→ hook ──→ ResponseResolver
//!                                                   │
//!                         ┌─────────────────────────┴───────────┐
//!                         ▼                                     ▼
//!                  type: "response"                      type: "redirect"
//!               reply {dataType, data}             RedirectRouter opens window,
//!                                                  waits for ready, calls
//!                                                  credentialEventProxy.send
//!                                                            │
//!                                                            ▼
//!                                          window: receive_credential_event
//!                                                  → respond_with(reply)
//! ```
//!
//! ## Failure Scope
//!
//! | Failure | Scope |
//! |---------|-------|
//! | Missing hooks, bad origin | `activate` fails before connecting |
//! | Permission not granted | install / uninstall fail, registry untouched |
//! | Bad hook result, hook error, window failure | that event's reply only |
//!
//! ## Module Structure
//!
//! ```text
//! credential-handler/
//! ├── domain/      # events, hook results, registrations, errors
//! ├── ports/       # CredentialHandlerApi, hooks, platform traits
//! ├── service/     # installer, activator, resolver, redirect, event proxy
//! ├── rpc/         # remote proxy with per-function deadlines
//! ├── adapters/    # in-process platform and loopback windows
//! ├── config.rs    # HandlerConfig::from_env
//! └── metrics.rs   # MetricsRecorder
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod rpc;
pub mod service;

// Re-exports
pub use config::{ConfigError, HandlerConfig, DEFAULT_PROXY_SERVICE, SEND_FUNCTION};
pub use domain::{
    CredentialEvent, CredentialEventType, CredentialReply, EventResponder, HandlerError,
    HandlerResult, HookError, IncomingCredentialEvent, MediatorOrigin, PermissionState,
    PlatformError, RedirectError, Registration, RegistryError, ReplyResult, RpcError, ShapeError,
};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics};
pub use ports::{
    hook_fn, CredentialEventSource, CredentialHandlerApi, CredentialHook, HandlerRegistry,
    Injector, PermissionGate, RemoteService, RpcServer, WindowConnector, WindowHandle,
    WindowOpener,
};
pub use rpc::{CallTimeout, RemoteFunction, RemoteProxy};
pub use service::{
    receive_credential_event, receive_credential_event_with, ActivationOptions, ActiveHandler,
    CredentialEventProxy, CredentialHandlerService, ProxiedCredentialEvent, ServiceDependencies,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
