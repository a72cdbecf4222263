//! # Credential Events
//!
//! Events delivered by the platform and the one-shot reply capability
//! attached to them.
//!
//! Opaque payload fields use `Option<Value>`: `None` is an absent field and
//! `Some(Value::Null)` an explicit `null`. Both survive a serialization
//! round trip, which is what lets the redirect path forward an event verbatim.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use super::errors::HandlerError;
use super::result::CredentialReply;
use crate::ports::outbound::WindowOpener;

/// Outcome committed to the platform for one event.
pub type ReplyResult = Result<CredentialReply, HandlerError>;

/// Kind of credential event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialEventType {
    /// A relying party asks for a credential (`get` hook).
    Request,
    /// A relying party asks to persist a credential (`store` hook).
    Store,
}

impl CredentialEventType {
    /// Platform listener name this event type is delivered under.
    pub fn listener_name(&self) -> &'static str {
        match self {
            CredentialEventType::Request => "credentialrequest",
            CredentialEventType::Store => "credentialstore",
        }
    }

    /// Name of the application hook bound to this event type.
    pub fn hook_name(&self) -> &'static str {
        match self {
            CredentialEventType::Request => "get",
            CredentialEventType::Store => "store",
        }
    }
}

impl fmt::Display for CredentialEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialEventType::Request => write!(f, "request"),
            CredentialEventType::Store => write!(f, "store"),
        }
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)` instead of `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Data carried by a credential event.
///
/// Serializes to the forwarded redirect payload
/// `{type, credentialRequestOptions?, credential?, hintKey?}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub event_type: CredentialEventType,

    /// Query describing the requested credential (request events).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub credential_request_options: Option<Value>,

    /// Credential being stored (store events).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub credential: Option<Value>,

    /// Identifier of the registered hint that triggered the event.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub hint_key: Option<Value>,
}

impl CredentialEvent {
    /// Create a request event.
    pub fn request(credential_request_options: Value) -> Self {
        Self {
            event_type: CredentialEventType::Request,
            credential_request_options: Some(credential_request_options),
            credential: None,
            hint_key: None,
        }
    }

    /// Create a store event.
    pub fn store(credential: Value) -> Self {
        Self {
            event_type: CredentialEventType::Store,
            credential_request_options: None,
            credential: Some(credential),
            hint_key: None,
        }
    }

    /// Attach the hint key that triggered this event.
    pub fn with_hint_key(mut self, hint_key: impl Into<Value>) -> Self {
        self.hint_key = Some(hint_key.into());
        self
    }
}

/// One-shot `respondWith` capability attached to a platform event.
///
/// Consuming `self` guarantees that at most one reply is committed.
#[derive(Debug)]
pub struct EventResponder {
    sender: oneshot::Sender<ReplyResult>,
}

impl EventResponder {
    /// Create a responder and the receiver the platform awaits.
    pub fn channel() -> (Self, oneshot::Receiver<ReplyResult>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Await `reply` and commit its outcome.
    ///
    /// Returns `false` if the platform stopped waiting for the reply.
    pub async fn respond_with<F>(self, reply: F) -> bool
    where
        F: Future<Output = ReplyResult>,
    {
        let outcome = reply.await;
        self.sender.send(outcome).is_ok()
    }
}

/// Event as delivered by the platform: data, reply capability and the
/// platform's window opener for this interaction.
pub struct IncomingCredentialEvent {
    event: CredentialEvent,
    responder: EventResponder,
    windows: Arc<dyn WindowOpener>,
}

impl IncomingCredentialEvent {
    /// Wrap event data with its reply capability and window opener.
    pub fn new(
        event: CredentialEvent,
        responder: EventResponder,
        windows: Arc<dyn WindowOpener>,
    ) -> Self {
        Self {
            event,
            responder,
            windows,
        }
    }

    /// Event data.
    pub fn event(&self) -> &CredentialEvent {
        &self.event
    }

    /// Split into data, responder and window opener.
    pub fn into_parts(self) -> (CredentialEvent, EventResponder, Arc<dyn WindowOpener>) {
        (self.event, self.responder, self.windows)
    }
}

impl fmt::Debug for IncomingCredentialEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingCredentialEvent")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}
