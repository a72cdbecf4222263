//! # Domain Value Objects
//!
//! Immutable value types shared by the installer and the activator.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

use super::errors::HandlerError;

/// Answer from the permission gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The caller may manage credential hints.
    Granted,
    /// The user refused.
    Denied,
    /// The prompt was dismissed without a decision.
    Prompt,
}

impl PermissionState {
    /// Only `Granted` counts as permission.
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Platform-held handle for a registered handler URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    id: Uuid,
    url: Url,
}

impl Registration {
    /// Create a registration for `url`.
    pub fn new(url: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
        }
    }

    /// Registration id assigned by the registry.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Registered handler URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Origin allowed to deliver events to an activated handler.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediatorOrigin(String);

impl MediatorOrigin {
    /// Parse an origin such as `https://mediator.example`.
    ///
    /// Paths are dropped; opaque origins (`data:`, `file:`) are rejected.
    pub fn parse(raw: &str) -> Result<Self, HandlerError> {
        let url = Url::parse(raw).map_err(|e| {
            HandlerError::InvalidArgument(format!("invalid mediator origin {raw:?}: {e}"))
        })?;

        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(HandlerError::InvalidArgument(format!(
                "mediator origin {raw:?} is opaque"
            )));
        }

        Ok(Self(origin.ascii_serialization()))
    }

    /// Serialized origin.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediatorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
