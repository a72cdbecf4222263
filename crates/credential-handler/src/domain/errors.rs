//! # Domain Errors
//!
//! Error taxonomy for credential handler activation and redirect.
//!
//! Pre-connection errors (`InvalidArgument`, `Platform`) abort a whole
//! activation. Everything raised while resolving a single event is delivered
//! through that event's reply and never stops the handler.

use thiserror::Error;

use super::event::CredentialEventType;

/// A hook returned a value that is not a valid `HandlerResult`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The hook result was not a JSON object.
    #[error("Return value of \"get\" or \"store\" hook must be an object.")]
    NotAnObject,

    /// The `type` tag was missing or not one of the accepted values.
    #[error("Return value of \"get\" or \"store\" must have a type of \"response\" or \"redirect\".")]
    UnknownType,

    /// A `redirect` result was missing a usable `url`.
    #[error("Invalid redirect result: {0}")]
    InvalidRedirect(String),
}

/// Remote-call transport errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// A bounded call did not complete in time.
    #[error("Remote call {function} timed out after {timeout_ms}ms")]
    Timeout {
        /// Function that was called
        function: String,
        /// Configured bound in milliseconds
        timeout_ms: u64,
    },

    /// The remote context went away.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// No service with that name is exposed by the remote context.
    #[error("Unknown remote service: {0}")]
    UnknownService(String),

    /// The service does not expose that function.
    #[error("Unknown remote function {service}.{function}")]
    UnknownFunction {
        /// Service name
        service: String,
        /// Function name
        function: String,
    },

    /// The remote function rejected.
    #[error("Remote call failed: {0}")]
    Remote(String),

    /// Arguments or results could not be encoded.
    #[error("Codec error: {0}")]
    Codec(String),
}

/// Errors raised by the redirect router.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RedirectError {
    /// The platform could not open the window.
    #[error("Window failed to open: {0}")]
    WindowOpen(String),

    /// The window opened but its RPC channel never became ready.
    #[error("Window channel not ready: {0}")]
    ChannelNotReady(String),

    /// The remote `send` call failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Handler registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The platform refused the registration.
    #[error("Registration rejected: {0}")]
    Rejected(String),

    /// No registration exists for the URL.
    #[error("Registration not found: {0}")]
    NotFound(String),

    /// The registry could not be reached.
    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}

/// Credential-event delivery errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A handler is already connected to this event source.
    #[error("Event source already connected")]
    AlreadyConnected,

    /// The platform refused the connection.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The event stream or reply channel closed.
    #[error("Event channel closed")]
    Closed,
}

/// Error raised by an application hook.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    /// Create a hook error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Top-level credential handler error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The permission gate did not grant access.
    #[error("Permission denied.")]
    PermissionDenied,

    /// Registration produced no handle.
    #[error("Credential handler not registered.")]
    NotRegistered,

    /// Activation arguments were invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Hook returned an invalid result.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// Redirect to a window failed.
    #[error(transparent)]
    Redirect(#[from] RedirectError),

    /// The hook itself failed.
    #[error("Hook failed: {0}")]
    Hook(#[from] HookError),

    /// No hook is bound for the event type.
    #[error("No listener bound for {0} events")]
    NoListener(CredentialEventType),

    /// Registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Platform connection failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl HandlerError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::PermissionDenied => "permission_denied",
            HandlerError::NotRegistered => "not_registered",
            HandlerError::InvalidArgument(_) => "invalid_argument",
            HandlerError::Shape(_) => "shape",
            HandlerError::Redirect(_) => "redirect",
            HandlerError::Hook(_) => "hook",
            HandlerError::NoListener(_) => "no_listener",
            HandlerError::Registry(_) => "registry",
            HandlerError::Platform(_) => "platform",
        }
    }
}
