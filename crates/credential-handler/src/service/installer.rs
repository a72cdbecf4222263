//! Handler Installer
//!
//! Registration lifecycle of a credential handler URL. Both mutating
//! operations go through the permission gate first; the registry is never
//! touched without a grant.

use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::domain::{HandlerError, Registration};
use crate::ports::outbound::{HandlerRegistry, PermissionGate};

/// Installs and uninstalls credential handler registrations.
pub struct HandlerInstaller {
    permissions: Arc<dyn PermissionGate>,
    registry: Arc<dyn HandlerRegistry>,
}

impl HandlerInstaller {
    /// Create an installer.
    pub fn new(permissions: Arc<dyn PermissionGate>, registry: Arc<dyn HandlerRegistry>) -> Self {
        Self {
            permissions,
            registry,
        }
    }

    async fn require_permission(&self) -> Result<(), HandlerError> {
        let state = self.permissions.request_permission().await;
        if !state.is_granted() {
            debug!(state = ?state, "[ch] Credential hint permission not granted");
            return Err(HandlerError::PermissionDenied);
        }
        Ok(())
    }

    /// Request permission, then register `url`.
    pub async fn install_handler(&self, url: &Url) -> Result<Registration, HandlerError> {
        self.require_permission().await?;

        let registration = self
            .get_handler_registration(url)
            .await
            .ok_or(HandlerError::NotRegistered)?;

        info!(url = %url, registration = %registration.id(), "[ch] Credential handler installed");
        Ok(registration)
    }

    /// Request permission, then remove the registration for `url`.
    pub async fn uninstall_handler(&self, url: &Url) -> Result<(), HandlerError> {
        self.require_permission().await?;

        self.registry.unregister(url).await?;
        info!(url = %url, "[ch] Credential handler uninstalled");
        Ok(())
    }

    /// Registration for `url`, or `None` if the registry failed.
    pub async fn get_handler_registration(&self, url: &Url) -> Option<Registration> {
        match self.registry.register(url).await {
            Ok(registration) => Some(registration),
            Err(e) => {
                debug!(url = %url, error = %e, "[ch] Registration unavailable");
                None
            }
        }
    }
}
