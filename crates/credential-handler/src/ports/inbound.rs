//! # Inbound Ports
//!
//! API trait defining what the credential handler can do for an
//! application.

use async_trait::async_trait;
use url::Url;

use crate::domain::{HandlerError, Registration};
use crate::service::{ActivationOptions, ActiveHandler};

/// Credential handler API - inbound port.
#[async_trait]
pub trait CredentialHandlerApi: Send + Sync {
    /// Ask permission, then register `url` as a credential handler.
    async fn install_handler(&self, url: &Url) -> Result<Registration, HandlerError>;

    /// Ask permission, then remove the registration for `url`.
    async fn uninstall_handler(&self, url: &Url) -> Result<(), HandlerError>;

    /// Best-effort registration lookup.
    ///
    /// `None` covers every failure; the underlying reason is only logged.
    async fn get_handler_registration(&self, url: &Url) -> Option<Registration>;

    /// Bind hooks and connect to the platform.
    async fn activate_handler(
        &self,
        options: ActivationOptions,
    ) -> Result<ActiveHandler, HandlerError>;
}
