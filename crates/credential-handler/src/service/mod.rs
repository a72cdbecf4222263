//! # Credential Handler Service
//!
//! Application service wiring the installer, the activator and the
//! redirect path behind `CredentialHandlerApi`.

pub mod activator;
pub mod event_proxy;
pub mod installer;
pub mod redirect;
pub mod resolution;


pub use activator::{ActivationOptions, ActiveHandler, CredentialHandler, HandlerActivator, ListenerMap};
pub use event_proxy::{
    receive_credential_event, receive_credential_event_with, CredentialEventProxy,
    ProxiedCredentialEvent,
};
pub use installer::HandlerInstaller;
pub use redirect::RedirectRouter;
pub use resolution::ResponseResolver;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::config::HandlerConfig;
use crate::domain::{HandlerError, Registration};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::inbound::CredentialHandlerApi;
use crate::ports::outbound::{
    CredentialEventSource, HandlerRegistry, PermissionGate, WindowConnector,
};

/// Platform collaborators the service is built from.
pub struct ServiceDependencies {
    /// Credential-hint permission prompt.
    pub permissions: Arc<dyn PermissionGate>,
    /// Handler URL registry.
    pub registry: Arc<dyn HandlerRegistry>,
    /// Platform event delivery.
    pub events: Arc<dyn CredentialEventSource>,
    /// Remote-call channels into redirect windows.
    pub connector: Arc<dyn WindowConnector>,
    /// Metrics sink.
    pub metrics: Arc<dyn MetricsRecorder>,
}

impl ServiceDependencies {
    /// Dependencies with metrics disabled.
    pub fn new(
        permissions: Arc<dyn PermissionGate>,
        registry: Arc<dyn HandlerRegistry>,
        events: Arc<dyn CredentialEventSource>,
        connector: Arc<dyn WindowConnector>,
    ) -> Self {
        Self {
            permissions,
            registry,
            events,
            connector,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Report through `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Credential handler service.
pub struct CredentialHandlerService {
    installer: HandlerInstaller,
    activator: HandlerActivator,
}

impl CredentialHandlerService {
    /// Build the service from its collaborators.
    pub fn new(deps: ServiceDependencies, config: &HandlerConfig) -> Self {
        let router = RedirectRouter::new(deps.connector, config, deps.metrics.clone());
        let resolver = ResponseResolver::new(router, deps.metrics);

        Self {
            installer: HandlerInstaller::new(deps.permissions, deps.registry),
            activator: HandlerActivator::new(deps.events, resolver),
        }
    }
}

#[async_trait]
impl CredentialHandlerApi for CredentialHandlerService {
    async fn install_handler(&self, url: &Url) -> Result<Registration, HandlerError> {
        self.installer.install_handler(url).await
    }

    async fn uninstall_handler(&self, url: &Url) -> Result<(), HandlerError> {
        self.installer.uninstall_handler(url).await
    }

    async fn get_handler_registration(&self, url: &Url) -> Option<Registration> {
        self.installer.get_handler_registration(url).await
    }

    async fn activate_handler(
        &self,
        options: ActivationOptions,
    ) -> Result<ActiveHandler, HandlerError> {
        self.activator.activate(options).await
    }
}
